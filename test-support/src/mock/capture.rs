//! 捕获日志器
//!
//! 把每条日志格式化为 `LEVEL message` 存进全局缓冲区。测试并行运行时缓冲区是共享的，
//! 断言应当用超级块编号等唯一标识过滤（见 [`logs_containing`]）。

use log::{LevelFilter, Log, Metadata, Record};
use sync::SpinLock;

static CAPTURED: SpinLock<Vec<String>> = SpinLock::new(Vec::new());

struct CaptureLogger;

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        CAPTURED
            .lock()
            .push(format!("{} {}", record.level(), record.args()));
    }

    fn flush(&self) {}
}

static LOGGER: CaptureLogger = CaptureLogger;

pub(crate) fn install() {
    // 其他日志器已安装时保留它，只是捕获不到内容
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Trace);
    }
}

/// 目前捕获的全部日志
pub fn captured_logs() -> Vec<String> {
    CAPTURED.lock().clone()
}

/// 包含 `pattern` 的日志
pub fn logs_containing(pattern: &str) -> Vec<String> {
    CAPTURED
        .lock()
        .iter()
        .filter(|line| line.contains(pattern))
        .cloned()
        .collect()
}
