//! The host global object graph.
//!
//! Translated startup code expects a fixed set of names rooted at `global`:
//! the `Array`/`Object`/`Uint8Array` constructors, `console`, `crypto`,
//! `fetch`, `fs`, and `process`. Nothing else exists on the surface, and the
//! shape is immutable after construction except through the ordinary
//! reflection set/delete operations.
//!
//! Host capabilities the bridge does not provide fail softly: `fs.write`
//! argument shapes outside its narrow contract and the `fetch` stub report
//! ENOSYS error objects through the normal callback/return channel, so the
//! translated program's own error handling keeps working.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use gonative_trap::{trap, Violation};

use crate::object::JsObject;
use crate::reflect;
use crate::value::{join_values, Value};
use crate::writer::Writer;

/// The `{message: "<name> not implemented", code: "ENOSYS"}` error object
/// reported for unimplemented host capabilities.
pub fn enosys(name: &str) -> Value {
    Value::from(JsObject::from_map(BTreeMap::from([
        (
            "message".to_string(),
            Value::from(format!("{name} not implemented")),
        ),
        ("code".to_string(), Value::from("ENOSYS")),
    ])))
}

/// The filesystem capability: two line-buffered writers standing in for
/// stdout and stderr. Everything else is unsupported.
struct Fs {
    stdout: Writer,
    stderr: Writer,
}

impl Fs {
    fn new(stdout: Writer, stderr: Writer) -> Fs {
        Fs { stdout, stderr }
    }

    /// The validation and byte-emission step of
    /// `fs.write(fd, buffer, offset, length, position, callback)`.
    ///
    /// Supported only for whole-buffer writes (`offset == 0`, `length ==
    /// buffer.len()`, `position` null) to fd 1 or 2. Anything else writes
    /// nothing and yields a single ENOSYS error object; a successful write
    /// yields `(null, length)`.
    ///
    /// Returns the callback's argument list instead of invoking the
    /// callback: the caller invokes it only after the filesystem borrow is
    /// released, so a callback may itself call `fs.write`.
    fn write(&mut self, args: &[Value]) -> Vec<Value> {
        let fd = args[0].as_number() as i32;
        let buffer = args[1].as_bytes();
        let offset = args[2].as_number() as i64;
        let length = args[3].as_number() as i64;
        let position = &args[4];

        let len = buffer.borrow().len();
        if offset != 0 || length != len as i64 || !position.is_null() {
            return vec![enosys("write")];
        }
        match fd {
            1 => self.stdout.write(&buffer.borrow()),
            2 => self.stderr.write(&buffer.borrow()),
            _ => return vec![enosys("write")],
        }
        vec![Value::Null, Value::from(len as f64)]
    }
}

fn fs_object(fs: Rc<RefCell<Fs>>) -> JsObject {
    let write = Value::from(JsObject::function(move |_, args| {
        let callback = args[5].clone();
        let callback_args = fs.borrow_mut().write(&args);
        reflect::apply(&callback, Value::Null, callback_args);
        Value::Null
    }));
    let constants = Value::from(JsObject::from_map(BTreeMap::from([
        ("O_WRONLY".to_string(), Value::from(-1.0)),
        ("O_RDWR".to_string(), Value::from(-1.0)),
        ("O_CREAT".to_string(), Value::from(-1.0)),
        ("O_TRUNC".to_string(), Value::from(-1.0)),
        ("O_APPEND".to_string(), Value::from(-1.0)),
        ("O_EXCL".to_string(), Value::from(-1.0)),
    ])));
    JsObject::with_properties(
        "fs",
        BTreeMap::from([
            ("constants".to_string(), constants),
            ("write".to_string(), write),
        ]),
    )
}

fn console_object() -> JsObject {
    let to_stdout = Value::from(JsObject::function(|_, args| {
        println!("{}", join_values(&args));
        Value::Null
    }));
    let to_stderr = Value::from(JsObject::function(|_, args| {
        eprintln!("{}", join_values(&args));
        Value::Null
    }));
    // "warm" is what the generated startup code actually looks up; "warn"
    // is provided alongside it.
    JsObject::with_properties(
        "console",
        BTreeMap::from([
            ("log".to_string(), to_stdout.clone()),
            ("info".to_string(), to_stdout),
            ("debug".to_string(), to_stderr.clone()),
            ("warn".to_string(), to_stderr.clone()),
            ("warm".to_string(), to_stderr.clone()),
            ("error".to_string(), to_stderr),
        ]),
    )
}

fn crypto_object() -> JsObject {
    let get_random_values = Value::from(JsObject::function(|_, args| {
        let buffer = args[0].as_bytes();
        let mut bytes = buffer.borrow_mut();
        if let Err(err) = getrandom::fill(bytes.as_mut_slice()) {
            trap(Violation::EntropySource(format!(
                "crypto.getRandomValues: {err}"
            )));
        }
        Value::Undefined
    }));
    JsObject::with_properties(
        "crypto",
        BTreeMap::from([("getRandomValues".to_string(), get_random_values)]),
    )
}

fn uint8_array_constructor() -> JsObject {
    JsObject::constructor("Uint8Array", |_, args| match args.len() {
        0 => Value::from(Vec::<u8>::new()),
        1 => {
            let len = &args[0];
            if len.is_number() {
                Value::from(vec![0u8; len.as_number() as usize])
            } else {
                trap(Violation::Unimplemented(format!(
                    "new Uint8Array({len}) is not implemented"
                )));
            }
        }
        n => trap(Violation::Unimplemented(format!(
            "new Uint8Array with {n} args is not implemented"
        ))),
    })
}

fn make_global() -> JsObject {
    let fetch = Value::from(JsObject::function(|_, _| Value::Undefined));
    let process = JsObject::with_properties(
        "process",
        BTreeMap::from([
            ("pid".to_string(), Value::from(-1.0)),
            ("ppid".to_string(), Value::from(-1.0)),
        ]),
    );
    let fs = Rc::new(RefCell::new(Fs::new(Writer::stdout(), Writer::stderr())));

    JsObject::with_properties(
        "global",
        BTreeMap::from([
            ("Array".to_string(), Value::from(JsObject::named("Array"))),
            ("Object".to_string(), Value::from(JsObject::named("Object"))),
            ("Uint8Array".to_string(), Value::from(uint8_array_constructor())),
            ("console".to_string(), Value::from(console_object())),
            ("crypto".to_string(), Value::from(crypto_object())),
            ("fetch".to_string(), fetch),
            ("fs".to_string(), Value::from(fs_object(fs))),
            ("process".to_string(), Value::from(process)),
        ]),
    )
}

thread_local! {
    static GLOBAL: Value = Value::from(make_global());
}

/// The host global object, built lazily on first access and shared for the
/// life of the process. The bridge is single-threaded (values are `Rc`), so
/// the thread-local is the process-wide singleton.
pub fn global() -> Value {
    GLOBAL.with(Value::clone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    struct Capture(Rc<RefCell<Vec<u8>>>);

    impl io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// The `fs.write` function of an fs entity over capture sinks, plus the
    /// sinks for inspection.
    fn capture_write() -> (Value, Rc<RefCell<Vec<u8>>>, Rc<RefCell<Vec<u8>>>) {
        let out = Rc::new(RefCell::new(Vec::new()));
        let err = Rc::new(RefCell::new(Vec::new()));
        let fs = Fs::new(
            Writer::new(Box::new(Capture(Rc::clone(&out)))),
            Writer::new(Box::new(Capture(Rc::clone(&err)))),
        );
        let object = Value::from(fs_object(Rc::new(RefCell::new(fs))));
        (reflect::get(&object, "write"), out, err)
    }

    /// A callback that records every argument list it receives.
    fn recording_callback() -> (Value, Rc<RefCell<Vec<Vec<Value>>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let recorded = Rc::clone(&calls);
        let callback = Value::from(JsObject::function(move |_, args| {
            recorded.borrow_mut().push(args);
            Value::Null
        }));
        (callback, calls)
    }

    fn write_args(fd: f64, buffer: Value, offset: f64, length: f64, callback: Value) -> Vec<Value> {
        vec![
            Value::from(fd),
            buffer,
            Value::from(offset),
            Value::from(length),
            Value::Null,
            callback,
        ]
    }

    #[test]
    fn whole_buffer_write_to_stdout_reports_length() {
        let (write, out, err) = capture_write();
        let (callback, calls) = recording_callback();
        let buffer = Value::from(b"hello\n".to_vec());

        reflect::apply(&write, Value::Undefined, write_args(1.0, buffer, 0.0, 6.0, callback));

        assert_eq!(&*out.borrow(), b"hello\n");
        assert!(err.borrow().is_empty());
        let calls = calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0], vec![Value::Null, Value::from(6.0)]);
    }

    #[test]
    fn fd_2_routes_to_stderr() {
        let (write, out, err) = capture_write();
        let (callback, _) = recording_callback();

        reflect::apply(
            &write,
            Value::Undefined,
            write_args(2.0, Value::from(b"oops\n".to_vec()), 0.0, 5.0, callback),
        );

        assert!(out.borrow().is_empty());
        assert_eq!(&*err.borrow(), b"oops\n");
    }

    #[test]
    fn nonzero_offset_is_enosys_and_writes_nothing() {
        let (write, out, _) = capture_write();
        let (callback, calls) = recording_callback();

        reflect::apply(
            &write,
            Value::Undefined,
            write_args(1.0, Value::from(b"abc\n".to_vec()), 1.0, 4.0, callback),
        );

        assert!(out.borrow().is_empty());
        let calls = calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].len(), 1);
        assert_eq!(reflect::get(&calls[0][0], "code").as_string(), "ENOSYS");
        assert_eq!(
            reflect::get(&calls[0][0], "message").as_string(),
            "write not implemented"
        );
    }

    #[test]
    fn short_length_is_enosys() {
        let (write, _, _) = capture_write();
        let (callback, calls) = recording_callback();

        reflect::apply(
            &write,
            Value::Undefined,
            write_args(1.0, Value::from(b"abcd".to_vec()), 0.0, 2.0, callback),
        );

        assert_eq!(reflect::get(&calls.borrow()[0][0], "code").as_string(), "ENOSYS");
    }

    #[test]
    fn non_null_position_is_enosys() {
        let (write, out, _) = capture_write();
        let (callback, calls) = recording_callback();
        let args = vec![
            Value::from(1.0),
            Value::from(b"x\n".to_vec()),
            Value::from(0.0),
            Value::from(2.0),
            Value::from(0.0),
            callback,
        ];

        reflect::apply(&write, Value::Undefined, args);

        assert!(out.borrow().is_empty());
        assert_eq!(reflect::get(&calls.borrow()[0][0], "code").as_string(), "ENOSYS");
    }

    #[test]
    fn unrecognized_fd_invokes_the_callback_exactly_once() {
        let (write, _, _) = capture_write();
        let (callback, calls) = recording_callback();

        reflect::apply(
            &write,
            Value::Undefined,
            write_args(7.0, Value::from(b"z\n".to_vec()), 0.0, 2.0, callback),
        );

        let calls = calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(reflect::get(&calls[0][0], "code").as_string(), "ENOSYS");
    }

    #[test]
    fn a_callback_can_issue_the_next_write() {
        let (write, out, _) = capture_write();
        let calls = Rc::new(RefCell::new(Vec::new()));

        let inner_callback = {
            let calls = Rc::clone(&calls);
            Value::from(JsObject::function(move |_, args| {
                calls.borrow_mut().push(args);
                Value::Null
            }))
        };
        // Consecutive writes chained through the completion callback, the
        // way translated code emits them.
        let outer_callback = {
            let calls = Rc::clone(&calls);
            let write = write.clone();
            Value::from(JsObject::function(move |_, args| {
                calls.borrow_mut().push(args);
                reflect::apply(
                    &write,
                    Value::Undefined,
                    write_args(
                        1.0,
                        Value::from(b"second\n".to_vec()),
                        0.0,
                        7.0,
                        inner_callback.clone(),
                    ),
                );
                Value::Null
            }))
        };

        reflect::apply(
            &write,
            Value::Undefined,
            write_args(1.0, Value::from(b"first\n".to_vec()), 0.0, 6.0, outer_callback),
        );

        assert_eq!(&*out.borrow(), b"first\nsecond\n");
        let calls = calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], vec![Value::Null, Value::from(6.0)]);
        assert_eq!(calls[1], vec![Value::Null, Value::from(7.0)]);
    }
}
