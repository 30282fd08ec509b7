//! 字段路径：从森林根出发的子索引序列
//!
//! 文本形式以 `.` 连接索引，空串表示根森林，例如 `"0.1.2"`

use std::fmt;
use std::str::FromStr;

use crate::model::field::Field;
use crate::model::schema_store::SchemaError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath(Vec<usize>);

impl FieldPath {
    /// 空路径：根森林
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// 追加一级子索引
    pub fn child(&self, index: usize) -> Self {
        let mut indices = self.0.clone();
        indices.push(index);
        Self(indices)
    }

    /// 拆分为父路径与末级索引；根路径返回 None
    pub fn split_last(&self) -> Option<(FieldPath, usize)> {
        let (&last, parent) = self.0.split_last()?;
        Some((FieldPath(parent.to_vec()), last))
    }

    /// 只读定位：路径所指的子字段序列
    pub fn resolve_children<'a>(&self, fields: &'a [Field]) -> Result<&'a [Field], SchemaError> {
        let mut current = fields;
        for (depth, &index) in self.0.iter().enumerate() {
            current = current
                .get(index)
                .and_then(Field::children)
                .ok_or_else(|| self.not_found(depth))?;
        }
        Ok(current)
    }

    /// 只读定位：路径所指的字段（路径不能为空）
    pub fn resolve_field<'a>(&self, fields: &'a [Field]) -> Result<&'a Field, SchemaError> {
        let (parent, index) = self.split_last().ok_or(SchemaError::InvalidPath)?;
        let siblings = self.resolve_prefix(&parent, fields)?;
        siblings.get(index).ok_or_else(|| self.not_found(parent.depth()))
    }

    /// 可变定位：路径所指的子字段序列（空路径即根森林）
    pub(crate) fn resolve_children_mut<'a>(
        &self,
        fields: &'a mut Vec<Field>,
    ) -> Result<&'a mut Vec<Field>, SchemaError> {
        self.descend_mut(self.indices(), fields)
    }

    /// 可变定位：路径所指的字段（路径不能为空）
    pub(crate) fn resolve_field_mut<'a>(
        &self,
        fields: &'a mut Vec<Field>,
    ) -> Result<&'a mut Field, SchemaError> {
        let (index, parent) = self.0.split_last().ok_or(SchemaError::InvalidPath)?;
        let siblings = self.descend_mut(parent, fields)?;
        siblings
            .get_mut(*index)
            .ok_or_else(|| self.not_found(parent.len()))
    }

    /// 从父序列中移除路径末级所指字段，返回被移除的字段
    pub(crate) fn remove_from(&self, fields: &mut Vec<Field>) -> Result<Field, SchemaError> {
        let (index, parent) = self.0.split_last().ok_or(SchemaError::InvalidPath)?;
        let siblings = self.descend_mut(parent, fields)?;
        if *index >= siblings.len() {
            return Err(self.not_found(parent.len()));
        }
        Ok(siblings.remove(*index))
    }

    fn resolve_prefix<'a>(&self, prefix: &FieldPath, fields: &'a [Field]) -> Result<&'a [Field], SchemaError> {
        // 错误信息使用完整路径
        prefix.resolve_children(fields).map_err(|err| match err {
            SchemaError::PathNotFound { depth, .. } => self.not_found(depth),
            other => other,
        })
    }

    fn descend_mut<'a>(
        &self,
        prefix: &[usize],
        fields: &'a mut Vec<Field>,
    ) -> Result<&'a mut Vec<Field>, SchemaError> {
        let mut current = fields;
        for (depth, &index) in prefix.iter().enumerate() {
            current = current
                .get_mut(index)
                .and_then(Field::children_mut)
                .ok_or_else(|| self.not_found(depth))?;
        }
        Ok(current)
    }

    fn not_found(&self, depth: usize) -> SchemaError {
        SchemaError::PathNotFound {
            path: self.to_string(),
            depth,
        }
    }
}

impl From<Vec<usize>> for FieldPath {
    fn from(indices: Vec<usize>) -> Self {
        Self(indices)
    }
}

impl From<&[usize]> for FieldPath {
    fn from(indices: &[usize]) -> Self {
        Self(indices.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for FieldPath {
    fn from(indices: [usize; N]) -> Self {
        Self(indices.to_vec())
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", index)?;
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::root());
        }
        s.split('.')
            .map(|part| part.parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
            .map_err(|_| SchemaError::MalformedPath(s.to_string()))
    }
}
