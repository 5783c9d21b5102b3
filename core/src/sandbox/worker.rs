use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Duration;

use serde_json::Value;

use super::{WorkerRequest, WorkerResponse};

/// Evaluate one expression against the worker namespace. `echo(..)`
/// appends its space-joined arguments to the log and returns its last
/// argument; `sleep(ms)` blocks and returns `ms`; any other unknown name
/// is an evaluation error. The evaluated code sees nothing else: no
/// filesystem, network, or environment.
pub fn evaluate(code: &str) -> WorkerResponse {
    let mut logs: Vec<String> = Vec::new();
    let mut namespace = |name: &str, args: Vec<f64>| -> Option<f64> {
        match name {
            "echo" => {
                let rendered: Vec<String> = args.iter().map(|v| format_number(*v)).collect();
                logs.push(rendered.join(" "));
                Some(args.last().copied().unwrap_or(0.0))
            }
            "sleep" => {
                let ms = args.first().copied().unwrap_or(0.0);
                if ms.is_finite() && ms > 0.0 {
                    thread::sleep(Duration::from_millis(ms as u64));
                }
                Some(ms)
            }
            _ => None,
        }
    };

    match fasteval::ez_eval(code, &mut namespace) {
        Ok(value) => WorkerResponse {
            logs,
            result: number_value(value),
            error: None,
        },
        Err(err) => WorkerResponse {
            logs,
            result: None,
            error: Some(err.to_string()),
        },
    }
}

// Integral values render as JSON integers; non-finite values have no JSON
// representation and drop the result field entirely.
fn number_value(value: f64) -> Option<Value> {
    if !value.is_finite() {
        None
    } else if value.fract() == 0.0 && value.abs() < 1e15 {
        Some(Value::from(value as i64))
    } else {
        serde_json::Number::from_f64(value).map(Value::Number)
    }
}

fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Worker side of the sandbox protocol: read one request line from stdin,
/// evaluate it, write one response line to stdout, exit. The parent owns
/// the deadline and kills this process when it expires.
pub fn run() {
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line).is_err() || line.trim().is_empty() {
        return;
    }
    let response = match serde_json::from_str::<WorkerRequest>(line.trim()) {
        Ok(request) => evaluate(&request.code),
        Err(err) => WorkerResponse {
            logs: Vec::new(),
            result: None,
            error: Some(format!("malformed request: {err}")),
        },
    };
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Ok(encoded) = serde_json::to_string(&response) {
        let _ = writeln!(out, "{encoded}");
        let _ = out.flush();
    }
}
