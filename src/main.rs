//! 程序入口：初始化日志、加载 Slint UI，并绑定字段树的 VM 回调

use std::{cell::RefCell, rc::Rc, time::Instant};

use anyhow::Context;
use slint::{ComponentHandle, Model, ModelRc, SharedString, VecModel};
use tracing_subscriber::fmt::SubscriberBuilder;

use schema_builder::vm::bridge::*;
use schema_builder::{AppState, FieldKind, FieldOp, FieldPath, FieldRow};

slint::include_modules!();

// FieldRowData转换实现
impl From<&FieldRow> for FieldRowData {
    /// 将Rust FieldRow转换为Slint可用的数据结构
    fn from(row: &FieldRow) -> Self {
        Self {
            id: row.id.as_str().into(),
            name: row.name.as_str().into(),
            kind: row.kind.selector_value().into(),
            path: row.path.to_string().into(),
            json_path: row.json_path.as_str().into(),
            depth: row.depth as i32,
            nested: row.kind == FieldKind::Nested,
            child_count: row.child_count as i32,
        }
    }
}

/// VM桥接器：管理UI与数据层的交互
struct ViewModelBridge {
    app_state: Rc<RefCell<AppState>>,
    row_model: Rc<VecModel<FieldRowData>>,
}

impl ViewModelBridge {
    /// 创建新的VM桥接器并绑定所有回调
    fn new(app_window: &AppWindow, app_state: Rc<RefCell<AppState>>) -> Self {
        let bridge = Self {
            app_state,
            row_model: Rc::new(VecModel::default()),
        };

        bridge.setup_callbacks(app_window);
        bridge
    }

    /// 设置所有UI回调函数
    fn setup_callbacks(&self, app_window: &AppWindow) {
        // === 添加字段回调（空路径为顶层） ===
        {
            let app_state = self.app_state.clone();
            let row_model = self.row_model.clone();
            let app_window_weak = app_window.as_weak();
            app_window.on_add_field(move |path| {
                if let Some(app_window) = app_window_weak.upgrade() {
                    Self::handle_field_op(&app_window, &app_state, &row_model, &path, FieldOp::AddField);
                }
            });
        }

        // === 删除字段回调 ===
        {
            let app_state = self.app_state.clone();
            let row_model = self.row_model.clone();
            let app_window_weak = app_window.as_weak();
            app_window.on_remove_field(move |path| {
                if let Some(app_window) = app_window_weak.upgrade() {
                    Self::handle_field_op(&app_window, &app_state, &row_model, &path, FieldOp::RemoveField);
                }
            });
        }

        // === 重命名回调 ===
        {
            let app_state = self.app_state.clone();
            let row_model = self.row_model.clone();
            let app_window_weak = app_window.as_weak();
            app_window.on_rename_field(move |path, name| {
                if let Some(app_window) = app_window_weak.upgrade() {
                    Self::handle_field_op(&app_window, &app_state, &row_model, &path, |p| {
                        FieldOp::UpdateField(p, "name".into(), name.to_string())
                    });
                }
            });
        }

        // === 类型切换回调 ===
        {
            let app_state = self.app_state.clone();
            let row_model = self.row_model.clone();
            let app_window_weak = app_window.as_weak();
            app_window.on_change_kind(move |path, kind| {
                if let Some(app_window) = app_window_weak.upgrade() {
                    Self::handle_field_op(&app_window, &app_state, &row_model, &path, |p| {
                        FieldOp::UpdateField(p, "kind".into(), kind.to_string())
                    });
                }
            });
        }

        // === 字段选择回调 ===
        {
            let app_state = self.app_state.clone();
            let app_window_weak = app_window.as_weak();
            app_window.on_field_selected(move |path| {
                if let Some(app_window) = app_window_weak.upgrade() {
                    Self::handle_field_selected(&app_window, &app_state, &path);
                }
            });
        }

        // === 复制预览回调 ===
        {
            let app_state = self.app_state.clone();
            let app_window_weak = app_window.as_weak();
            app_window.on_copy_preview(move || {
                if let Some(app_window) = app_window_weak.upgrade() {
                    Self::handle_copy_preview(&app_window, &app_state);
                }
            });
        }

        // === 导出预览回调 ===
        {
            let app_state = self.app_state.clone();
            let app_window_weak = app_window.as_weak();
            app_window.on_export_preview(move || {
                if let Some(app_window) = app_window_weak.upgrade() {
                    Self::handle_export_preview(&app_window, &app_state);
                }
            });
        }
    }

    /// 初始化UI状态
    fn initialize_ui(&self, app_window: &AppWindow) {
        let options: Vec<SharedString> = kind_options().into_iter().map(SharedString::from).collect();
        app_window.set_kind_options(ModelRc::new(VecModel::from(options)));
        app_window.set_field_model(ModelRc::from(self.row_model.clone()));
        app_window.set_status_message(STATUS_READY.into());
        Self::refresh_preview(app_window, &self.app_state);
    }

    /// 应用一次字段变更：解析路径、提交变更、刷新行与预览
    fn handle_field_op(
        app_window: &AppWindow,
        app_state: &Rc<RefCell<AppState>>,
        row_model: &VecModel<FieldRowData>,
        path: &str,
        make_op: impl FnOnce(FieldPath) -> FieldOp,
    ) {
        let start_time = Instant::now();

        let path = match path.parse::<FieldPath>() {
            Ok(path) => path,
            Err(e) => {
                app_window.set_status_message(error_status(&e).into());
                tracing::error!("无法解析字段路径 {:?}: {}", path, e);
                return;
            }
        };
        let op = make_op(path);

        // 借用在本语句内结束，后续刷新需要再次借用
        let result = app_state.borrow_mut().dispatch(op.clone());
        match result {
            Ok(snapshot) => {
                Self::sync_rows(row_model, &app_state.borrow().rows);
                Self::refresh_preview(app_window, app_state);
                app_window.set_field_count(snapshot.total_fields() as i32);
                app_window.set_status_message(status_for_op(&op).into());
                tracing::info!(
                    "{} 完成，rev={}，耗时: {}ms",
                    op,
                    snapshot.revision(),
                    start_time.elapsed().as_millis()
                );
            }
            Err(e) => {
                // 失败即无操作，仅提示
                app_window.set_status_message(error_status(&e).into());
            }
        }
    }

    /// 同步行模型：行结构未变时逐行更新，避免重建输入框打断编辑
    fn sync_rows(row_model: &VecModel<FieldRowData>, rows: &[FieldRow]) {
        let fresh: Vec<FieldRowData> = rows.iter().map(FieldRowData::from).collect();

        let same_layout = row_model.row_count() == fresh.len()
            && fresh
                .iter()
                .enumerate()
                .all(|(i, row)| row_model.row_data(i).is_some_and(|old| old.id == row.id));

        if same_layout {
            for (i, row) in fresh.into_iter().enumerate() {
                if row_model.row_data(i).as_ref() != Some(&row) {
                    row_model.set_row_data(i, row);
                }
            }
        } else {
            row_model.set_vec(fresh);
        }
    }

    /// 刷新预览与选中字段详情
    fn refresh_preview(app_window: &AppWindow, app_state: &Rc<RefCell<AppState>>) {
        let state = app_state.borrow();

        match state.preview_text() {
            Ok(text) => app_window.set_preview_text(text.into()),
            Err(e) => {
                app_window.set_status_message(error_status(&e).into());
                tracing::error!("预览序列化失败: {}", e);
            }
        }

        let (selected_id, selected_json_path) = state
            .selected_row()
            .map(|row| (row.id.to_string(), row.json_path.clone()))
            .unwrap_or_default();
        app_window.set_selected_id(selected_id.into());
        app_window.set_selected_json_path(selected_json_path.into());

        match state.selected_preview() {
            Ok(text) => app_window.set_selected_preview(text.into()),
            Err(e) => {
                app_window.set_selected_preview("".into());
                tracing::warn!("选中字段预览提取失败: {}", e);
            }
        }
    }

    /// 处理字段选择
    fn handle_field_selected(app_window: &AppWindow, app_state: &Rc<RefCell<AppState>>, path: &str) {
        let result = app_state.borrow_mut().select_field(path);
        match result {
            Ok(_) => {
                Self::refresh_preview(app_window, app_state);
                app_window.set_status_message(format!("已选中字段: [{}]", path).into());
            }
            Err(e) => {
                app_window.set_status_message(error_status(&e).into());
                tracing::warn!("选中字段失败: {}", e);
            }
        }
    }

    /// 处理复制预览
    fn handle_copy_preview(app_window: &AppWindow, app_state: &Rc<RefCell<AppState>>) {
        match app_state.borrow().copy_preview() {
            Ok(len) => {
                app_window.set_status_message(STATUS_COPIED.into());
                tracing::info!("预览已复制到剪贴板，长度: {} 字符", len);
            }
            Err(e) => {
                app_window.set_status_message(error_status(&e).into());
                tracing::error!("复制失败: {}", e);
            }
        }
    }

    /// 处理导出预览（保存对话框）
    fn handle_export_preview(app_window: &AppWindow, app_state: &Rc<RefCell<AppState>>) {
        use rfd::FileDialog;

        let mut dialog = FileDialog::new()
            .add_filter("JSON文件", &["json"])
            .set_title("导出 JSON 预览")
            .set_file_name(DEFAULT_EXPORT_FILE_NAME);
        if let Some(dir) = app_state.borrow().export_path.as_ref().and_then(|p| p.parent()) {
            dialog = dialog.set_directory(dir);
        }

        let Some(path) = dialog.save_file() else {
            app_window.set_status_message(STATUS_EXPORT_CANCELLED.into());
            tracing::info!("用户取消了导出");
            return;
        };

        let result = app_state.borrow_mut().export_preview(&path);
        match result {
            Ok(()) => {
                app_window.set_status_message(format!("{}: {}", STATUS_EXPORTED, path.display()).into());
            }
            Err(e) => {
                app_window.set_status_message(error_status(&e).into());
                tracing::error!("导出失败: {}", e);
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    // 初始化日志输出
    let _ = SubscriberBuilder::default()
        .with_max_level(tracing::Level::INFO)
        .try_init();

    let app = AppWindow::new().context("UI 初始化失败")?;
    let state = Rc::new(RefCell::new(AppState::default()));

    // 创建VM桥接器并绑定UI回调
    let bridge = ViewModelBridge::new(&app, state);
    bridge.initialize_ui(&app);

    tracing::info!("应用启动成功，UI已初始化");
    app.run().context("UI 事件循环异常退出")?;
    Ok(())
}
