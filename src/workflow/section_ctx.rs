//! 章节处理上下文
//!
//! 封装"我正在写哪篇文章的第几章"这一信息

use std::fmt::Display;

/// 章节处理上下文
#[derive(Debug, Clone)]
pub struct SectionCtx {
    /// 章节标识（slug）
    pub section_id: String,

    /// 章节序号（从1开始，仅用于日志显示）
    pub section_index: usize,

    /// 正文章节总数
    pub section_total: usize,
}

impl SectionCtx {
    pub fn new(section_id: impl Into<String>, section_index: usize, section_total: usize) -> Self {
        Self {
            section_id: section_id.into(),
            section_index,
            section_total,
        }
    }
}

impl Display for SectionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[章节 {}/{} {}]",
            self.section_index, self.section_total, self.section_id
        )
    }
}
