use mcp_types::JSONRPCMessage;
use mcp_types::Notification;
use mcp_types::ProgressNotificationParams;
use mcp_types::ProgressToken;
use pretty_assertions::assert_eq;

#[test]
fn deserialize_progress_notification() {
    let raw = r#"{
        "jsonrpc": "2.0",
        "method": "notifications/progress",
        "params": {
            "message": "Half way there",
            "progress": 0.5,
            "progressToken": 99,
            "total": 1.0
        }
    }"#;

    let msg = JSONRPCMessage::from_str(raw).expect("invalid JSONRPCMessage");

    let JSONRPCMessage::Notification(notif) = msg else {
        unreachable!()
    };

    let server_notif: Notification = Notification::try_from(notif).expect("conversion must succeed");

    let Notification::Progress(params) = server_notif else {
        unreachable!()
    };

    let expected_params = ProgressNotificationParams {
        message: Some("Half way there".into()),
        progress: 0.5,
        progress_token: ProgressToken::Integer(99),
        total: Some(1.0),
    };

    assert_eq!(params, expected_params);
}

#[test]
fn progress_token_accepts_string_form() {
    let raw = r#"{"jsonrpc":"2.0","method":"notifications/progress","params":{"progress":0.1,"progressToken":"abc"}}"#;
    let msg = JSONRPCMessage::from_str(raw).unwrap();
    let JSONRPCMessage::Notification(notif) = msg else {
        unreachable!()
    };
    let Notification::Progress(params) = Notification::try_from(notif).unwrap() else {
        unreachable!()
    };
    assert_eq!(params.progress_token, ProgressToken::String("abc".into()));
}
