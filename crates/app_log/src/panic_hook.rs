//! Panic hook for crash reporting

use backtrace::Backtrace;
use chrono::Local;
use std::any::Any;
use std::panic::PanicHookInfo;

/// Initialize the panic hook for crash reporting
pub fn init_panic_hook() {
    std::panic::set_hook(Box::new(panic_handler));
    tracing::debug!("Panic hook initialized");
}

fn payload_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<unknown>")
}

fn panic_handler(info: &PanicHookInfo) {
    let backtrace = Backtrace::new();
    let thread = std::thread::current();
    let thread_name = thread.name().unwrap_or("<unnamed>");

    let report = format!(
        "=== CRITICAL PANIC ===\n\
         Timestamp: {}\n\
         Thread: {}\n\
         Location: {:?}\n\
         Payload: {}\n\n\
         Stack Trace:\n{:?}",
        Local::now().to_rfc3339(),
        thread_name,
        info.location(),
        payload_message(info.payload()),
        backtrace
    );

    eprintln!("{}", report);
    tracing::error!("{}", report);

    let dump_path = std::env::temp_dir().join(format!(
        "islides_gallery_crash_{}.txt",
        Local::now().format("%Y%m%d_%H%M%S")
    ));
    match std::fs::write(&dump_path, &report) {
        Ok(()) => eprintln!("Crash report written to {}", dump_path.display()),
        Err(e) => eprintln!("Failed to write crash dump: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_message() {
        let s: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(payload_message(s.as_ref()), "boom");

        let owned: Box<dyn Any + Send> = Box::new(String::from("counter ledger"));
        assert_eq!(payload_message(owned.as_ref()), "counter ledger");

        let other: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(payload_message(other.as_ref()), "<unknown>");
    }
}
