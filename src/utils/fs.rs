//! IO helper: 预览导出

use std::{fs::File, io::{BufWriter, Write}, path::Path};

use serde_json::Value;

/// 将JSON数据保存到文件（两空格缩进，末尾换行）
pub fn write_json_file(p: &Path, value: &Value) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(p)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.write_all(b"\n")?;
    writer.flush()
}
