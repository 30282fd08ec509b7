//! AppState：应用核心状态，连接字段树、扁平字段行与预览输出

use std::path::{Path, PathBuf};

use jsonpath_rust::JsonPath;
use serde_json::Value;
use thiserror::Error;

use crate::model::field::FieldId;
use crate::model::field_path::FieldPath;
use crate::model::field_rows::{flatten_fields, FieldRow};
use crate::model::preview::preview_text;
use crate::model::schema_store::{FieldOp, SchemaError, SchemaStore, Snapshot};
use crate::utils::clipboard::{copy_to_clipboard, ClipboardError};
use crate::utils::fs::write_json_file;

#[derive(Debug, Default)]
pub struct AppState {
    pub store: SchemaStore,
    /// 当前快照的扁平行（每次成功变更后重建）
    pub rows: Vec<FieldRow>,
    /// 选中字段按 id 记录，路径因增删发生偏移时仍能跟踪
    pub selected: Option<FieldId>,
    pub export_path: Option<PathBuf>,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Schema(#[from] SchemaError),
    #[error("IO失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON序列化失败: {0}")]
    Json(#[from] serde_json::Error),
    #[error("JSONPath错误: {0}")]
    JsonPath(String),
    #[error("{0}")]
    Clipboard(#[from] ClipboardError),
}

impl AppState {
    /// 应用变更并刷新字段行；失败时状态不变
    pub fn dispatch(&mut self, op: FieldOp) -> Result<Snapshot, AppError> {
        let snapshot = self.store.dispatch(op)?;
        self.rows = flatten_fields(snapshot.fields());

        if let Some(id) = &self.selected {
            if !self.rows.iter().any(|row| &row.id == id) {
                tracing::info!("选中字段 {} 已被删除，清除选中状态", id);
                self.selected = None;
            }
        }
        Ok(snapshot)
    }

    pub fn preview(&self) -> &Value {
        self.store.current_preview()
    }

    /// 当前预览的 pretty 文本
    pub fn preview_text(&self) -> Result<String, AppError> {
        Ok(preview_text(self.store.current_preview())?)
    }

    /// 按 JSONPath 提取预览中第一个匹配节点的 pretty 字符串
    pub fn extract_preview_subtree(&self, json_path: &str) -> Result<String, AppError> {
        let hits: Vec<&Value> = self
            .store
            .current_preview()
            .query(json_path)
            .map_err(|e| AppError::JsonPath(e.to_string()))?;
        let first = hits
            .into_iter()
            .next()
            .ok_or_else(|| AppError::JsonPath(format!("未匹配到任何节点: {}", json_path)))?;
        Ok(serde_json::to_string_pretty(first)?)
    }

    /// 选中字段并返回其预览子树文本；不在预览中的字段返回空串
    pub fn select_field(&mut self, path: &str) -> Result<String, AppError> {
        let path: FieldPath = path.parse()?;
        let id = self.store.current_snapshot().field_at(&path)?.id().clone();
        self.selected = Some(id);
        self.selected_preview()
    }

    pub fn selected_row(&self) -> Option<&FieldRow> {
        let id = self.selected.as_ref()?;
        self.rows.iter().find(|row| &row.id == id)
    }

    /// 选中字段的预览子树文本（变更后用于刷新详情区域）
    pub fn selected_preview(&self) -> Result<String, AppError> {
        match self.selected_row() {
            Some(row) if row.in_preview() => self.extract_preview_subtree(&row.json_path),
            _ => Ok(String::new()),
        }
    }

    /// 将当前预览导出到文件
    pub fn export_preview(&mut self, path: &Path) -> Result<(), AppError> {
        write_json_file(path, self.store.current_preview())?;
        self.export_path = Some(path.to_path_buf());
        tracing::info!("预览已导出到: {}", path.display());
        Ok(())
    }

    /// 复制当前预览到剪贴板，返回复制的字符数
    pub fn copy_preview(&self) -> Result<usize, AppError> {
        let text = self.preview_text()?;
        copy_to_clipboard(&text)?;
        Ok(text.chars().count())
    }
}
