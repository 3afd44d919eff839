use std::fmt;

/// 流水线阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Parse,
    Questions,
    Blocks,
    Comparison,
    Assembly,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Parse => "parse",
            Stage::Questions => "questions",
            Stage::Blocks => "blocks",
            Stage::Comparison => "comparison",
            Stage::Assembly => "assembly",
        }
    }

    /// 日志显示名称
    pub fn label(self) -> &'static str {
        match self {
            Stage::Parse => "产品解析",
            Stage::Questions => "FAQ 生成",
            Stage::Blocks => "内容块生成",
            Stage::Comparison => "对比生成",
            Stage::Assembly => "文档组装",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
