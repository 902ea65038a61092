use axum::{
    body::Body,
    response::{IntoResponse, Response},
};
use http::{HeaderValue, StatusCode, header::CONNECTION};
use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::sync::Once;
use tower_http::catch_panic::ResponseForPanic;

thread_local! {
    static LAST_PANIC: RefCell<Option<PanicReport>> = const { RefCell::new(None) };
}

struct PanicReport {
    location: String,
    backtrace: String,
}

/// Install a process-wide panic hook that records where a panic happened.
///
/// The backtrace is captured at the panic site and parked in a thread local,
/// where [`PanicResponder`] picks it up once unwinding reaches the recovery
/// layer. The previously installed hook still runs afterwards. Idempotent.
pub fn install_panic_hook() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let location = info
                .location()
                .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
                .unwrap_or_else(|| "unknown".to_string());
            let backtrace = Backtrace::force_capture().to_string();
            LAST_PANIC.with(|slot| {
                *slot.borrow_mut() = Some(PanicReport {
                    location,
                    backtrace,
                });
            });
            previous(info);
        }));
    });
}

fn panic_message(err: &(dyn Any + Send)) -> &str {
    if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&'static str>() {
        s
    } else {
        "unknown panic payload"
    }
}

/// Turns a panic caught by `CatchPanicLayer` into a single 500 response.
///
/// The connection is marked for closing. Details go to the log, and into the
/// body only when `debug` is set.
#[derive(Clone, Debug)]
pub struct PanicResponder {
    pub debug: bool,
}

impl ResponseForPanic for PanicResponder {
    type ResponseBody = Body;

    fn response_for_panic(&mut self, err: Box<dyn Any + Send + 'static>) -> Response<Body> {
        let message = panic_message(err.as_ref());
        let report = LAST_PANIC.with(|slot| slot.borrow_mut().take());
        let (location, backtrace) = match &report {
            Some(r) => (r.location.as_str(), r.backtrace.as_str()),
            None => ("unknown", "no backtrace captured"),
        };

        tracing::error!(
            panic = message,
            location,
            "Recovered from panic in request handler\n{}",
            backtrace
        );

        let body = if self.debug {
            format!("{message}\nat {location}\n\n{backtrace}")
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
                .canonical_reason()
                .unwrap_or("Internal Server Error")
                .to_string()
        };

        let mut response = (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
        response
            .headers_mut()
            .insert(CONNECTION, HeaderValue::from_static("close"));
        response
    }
}
