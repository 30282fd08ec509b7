//! Clipboard: 预览文本复制到系统剪贴板

use copypasta::{ClipboardContext, ClipboardProvider};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClipboardError {
    #[error("剪贴板不可用: {0}")]
    Unavailable(String),
    #[error("写入剪贴板失败: {0}")]
    Write(String),
}

/// 将文本复制到系统剪贴板
pub fn copy_to_clipboard(text: &str) -> Result<(), ClipboardError> {
    let mut ctx = ClipboardContext::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?;
    ctx.set_contents(text.to_string())
        .map_err(|e| ClipboardError::Write(e.to_string()))?;
    tracing::debug!("已写入剪贴板，长度: {} 字符", text.chars().count());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[ignore = "需要图形会话中的系统剪贴板"]
    fn test_copy_preview_text() {
        let text = "{\n  \"地址\": {\n    \"city\": \"String\"\n  }\n}";
        copy_to_clipboard(text).expect("复制到剪贴板应该成功");

        let mut ctx = ClipboardContext::new().unwrap();
        assert_eq!(ctx.get_contents().unwrap(), text);
    }
}
