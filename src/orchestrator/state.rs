use std::fmt;

/// 流水线状态
///
/// ```text
/// Init → InputLoaded → Parsed → QuestionsGenerated → BlocksGenerated
///      → ComparisonGenerated → Assembled
/// ```
///
/// 任何状态都可以进入 `Aborted(reason)`；`Assembled` 和 `Aborted` 是终态
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PipelineState {
    #[default]
    Init,
    InputLoaded,
    Parsed,
    QuestionsGenerated,
    BlocksGenerated,
    ComparisonGenerated,
    Assembled,
    Aborted(String),
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PipelineState::Assembled | PipelineState::Aborted(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            PipelineState::Init => "Init",
            PipelineState::InputLoaded => "InputLoaded",
            PipelineState::Parsed => "Parsed",
            PipelineState::QuestionsGenerated => "QuestionsGenerated",
            PipelineState::BlocksGenerated => "BlocksGenerated",
            PipelineState::ComparisonGenerated => "ComparisonGenerated",
            PipelineState::Assembled => "Assembled",
            PipelineState::Aborted(_) => "Aborted",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineState::Aborted(reason) => write!(f, "Aborted({})", reason),
            other => f.write_str(other.name()),
        }
    }
}
