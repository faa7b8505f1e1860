use anyhow::Result;
use test_utils::engine_answer_fixture;

use super::EngineAnswer;
use super::EngineHealth;
use super::EngineStatus;
use super::GatewayError;

#[test]
fn it_counts_documents() -> Result<()> {
    let answer: EngineAnswer = serde_json::from_str(&engine_answer_fixture("42", 3))?;
    assert_eq!(answer.generation, "42");
    assert_eq!(answer.document_count(), 3);

    return Ok(());
}

#[test]
fn it_counts_missing_documents_as_zero() -> Result<()> {
    let answer: EngineAnswer = serde_json::from_str(r#"{"generation": "42"}"#)?;
    assert_eq!(answer.document_count(), 0);

    let answer: EngineAnswer =
        serde_json::from_str(r#"{"generation": "42", "documents": null}"#)?;
    assert_eq!(answer.document_count(), 0);

    return Ok(());
}

#[test]
fn it_rejects_missing_generation() {
    let res = serde_json::from_str::<EngineAnswer>(r#"{"documents": []}"#);
    assert!(res.is_err());
}

#[test]
fn it_formats_engine_status() {
    assert_eq!(EngineStatus::Checking.to_string(), "Checking engine...");
    assert_eq!(
        EngineStatus::Online(EngineHealth {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
        })
        .to_string(),
        "Active (v0.1.0)"
    );
    assert_eq!(
        EngineStatus::Offline("connection refused".to_string()).to_string(),
        "Offline: connection refused"
    );
}

#[test]
fn it_formats_gateway_errors() {
    let err = GatewayError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        err.to_string(),
        "engine responded with status 500 Internal Server Error"
    );

    let decode_err = serde_json::from_str::<EngineAnswer>("nope").unwrap_err();
    let err = GatewayError::from(decode_err);
    assert!(err
        .to_string()
        .starts_with("engine response could not be decoded"));
}
