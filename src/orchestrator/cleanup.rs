use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::orchestrator::events::{EventSink, PipelineEvent};

/// 删除本次运行登记过的输出文件，返回实际删除的数量
///
/// 尽力而为：文件不存在不算错误，删除失败只记日志
pub async fn remove_outputs(paths: &[PathBuf], events: &dyn EventSink) -> usize {
    let mut removed = 0;

    for path in paths {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                removed += 1;
                events.emit(&PipelineEvent::OutputRemoved { path: path.clone() });
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("输出文件不存在，跳过: {}", path.display());
            }
            Err(e) => {
                warn!("⚠️ 无法删除文件 {}: {}", path.display(), e);
            }
        }
    }

    removed
}
