use super::*;

#[test]
fn test_capture_sink_accumulates_lines() {
    let mut sink = CaptureSink::new();
    sink.emit("hello").expect("emit");
    sink.emit("world").expect("emit");
    assert_eq!(sink.captured(), "hello\nworld\n");
    assert_eq!(sink.into_string(), "hello\nworld\n");
}

#[test]
fn test_writer_sink_round_trip() {
    let mut sink = WriterSink::new(Vec::new());
    sink.emit("a").expect("emit");
    sink.emit("b").expect("emit");
    let bytes = sink.into_inner();
    assert_eq!(String::from_utf8(bytes).expect("utf8"), "a\nb\n");
}

#[test]
fn test_fn_sink_propagates_errors() {
    let mut calls = 0;
    {
        let mut sink = FnSink::new(|_line| {
            calls += 1;
            Err(std::io::Error::other("sink refused"))
        });
        assert!(sink.emit("x").is_err());
    }
    assert_eq!(calls, 1);
}
