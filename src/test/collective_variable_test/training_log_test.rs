use super::*;

#[test]
fn test_training_log_header_once() {
    let mut logger = TrainingLogger::new();
    assert!(!logger.header_printed());

    let entries = [("Epoch", LogValue::from(1usize)), ("Loss", LogValue::from(-12.3456))];
    let first = logger.format_log(&entries, Some(&[6, 10]), 2);
    assert_eq!(first, vec!["Epoch Loss      ", "1     -12.35    "]);
    assert!(logger.header_printed());

    let second = logger.format_log(&entries, Some(&[6, 10]), 3);
    assert_eq!(second, vec!["1     -12.346   "]);

    logger.reset_header();
    assert_eq!(logger.format_log(&entries, Some(&[6, 10]), 2).len(), 2);
}

#[test]
fn test_training_log_default_spacing() {
    let mut logger = TrainingLogger::default();
    let lines = logger.format_log(
        &[("a", LogValue::Int(3)), ("b", LogValue::Float(0.5))],
        Some(&[4]),
        1,
    );
    // the second column falls back to DEFAULT_LOG_SPACING
    assert_eq!(lines[0], format!("a   {:<16}", "b"));
    assert_eq!(lines[1], format!("3   {:<16}", "0.5"));
    assert_eq!(lines[1].len(), 4 + DEFAULT_LOG_SPACING);

    let mut logger = TrainingLogger::new();
    let lines = logger.format_log(&[("epoch", LogValue::Int(7))], None, 2);
    assert_eq!(lines[1].len(), DEFAULT_LOG_SPACING);
    logger.print_log(&[("epoch", LogValue::Int(8))], None, 2);
}
