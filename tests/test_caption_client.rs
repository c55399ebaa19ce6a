//! Integration tests for the caption client retry loop
//!
//! These tests drive `CaptionClient` with a scripted backend and a backoff
//! that records delays, so no network call or real sleep happens.

mod common;

use std::time::Duration;

use base64::{Engine as _, engine::general_purpose};
use common::fake_backend::{RecordingBackoff, ScriptedBackend, server_error, timeout};
use common::test_images::write_solid;
use dataset_captioner::caption::prompt::{MAX_TOKENS, SYSTEM_PROMPT, TEMPERATURE, USER_PROMPT};
use dataset_captioner::caption::{CaptionClient, RetryPolicy};
use tempfile::TempDir;

fn policy() -> RetryPolicy {
    RetryPolicy::new(3, Duration::from_secs(5))
}

/// Test that two failures followed by a success yield the caption after two waits
#[test]
fn test_retry_then_success() {
    let dir = TempDir::new().unwrap();
    let image = write_solid(dir.path(), "image0.jpg", 16, 16, [10, 20, 30]);

    let backend =
        ScriptedBackend::scripted_then(vec![Err(server_error()), Err(timeout())], "a red bicycle");
    let backoff = RecordingBackoff::default();
    let client = CaptionClient::new(&backend).with_backoff(&backoff).with_policy(policy());

    let caption = client.caption(&image, "", "");

    assert_eq!(caption, "a red bicycle");
    assert_eq!(backend.calls(), 3);
    assert_eq!(backoff.delays(), vec![Duration::from_secs(5); 2]);
}

/// Test that exhausting every attempt returns an empty caption without a trailing wait
#[test]
fn test_all_attempts_fail() {
    let dir = TempDir::new().unwrap();
    let image = write_solid(dir.path(), "image0.jpg", 16, 16, [10, 20, 30]);

    let backend = ScriptedBackend::failing();
    let backoff = RecordingBackoff::default();
    let client = CaptionClient::new(&backend).with_backoff(&backoff).with_policy(policy());

    let caption = client.caption(&image, "prefix", "suffix");

    assert_eq!(caption, "");
    assert_eq!(backend.calls(), 3);
    assert_eq!(backoff.delays().len(), 2);
}

/// Test that a single-attempt policy never waits
#[test]
fn test_single_attempt_never_waits() {
    let dir = TempDir::new().unwrap();
    let image = write_solid(dir.path(), "image0.jpg", 8, 8, [0, 0, 0]);

    let backend = ScriptedBackend::failing();
    let backoff = RecordingBackoff::default();
    let client = CaptionClient::new(&backend)
        .with_backoff(&backoff)
        .with_policy(RetryPolicy::new(1, Duration::from_secs(5)));

    assert_eq!(client.caption(&image, "", ""), "");
    assert_eq!(backend.calls(), 1);
    assert!(backoff.delays().is_empty());
}

/// Test that prefix and suffix wrap the caption with comma separators
#[test]
fn test_prefix_and_suffix() {
    let dir = TempDir::new().unwrap();
    let image = write_solid(dir.path(), "image0.jpg", 16, 16, [10, 20, 30]);

    let backend = ScriptedBackend::always("cat sitting");
    let client = CaptionClient::new(&backend).with_backoff(RecordingBackoff::default());

    assert_eq!(client.caption(&image, "a", "b"), "a, cat sitting, b");
    assert_eq!(client.caption(&image, "a", ""), "a, cat sitting");
    assert_eq!(client.caption(&image, "", "b"), "cat sitting, b");
}

/// Test that surrounding whitespace and quotes are stripped from the model output
#[test]
fn test_caption_is_cleaned() {
    let dir = TempDir::new().unwrap();
    let image = write_solid(dir.path(), "image0.jpg", 16, 16, [10, 20, 30]);

    let backend = ScriptedBackend::always("  \"a dog running on a beach\"\n");
    let client = CaptionClient::new(&backend).with_backoff(RecordingBackoff::default());

    assert_eq!(client.caption(&image, "", ""), "a dog running on a beach");
}

/// Test that a blank completion counts as a failed attempt
#[test]
fn test_blank_caption_is_retried() {
    let dir = TempDir::new().unwrap();
    let image = write_solid(dir.path(), "image0.jpg", 16, 16, [10, 20, 30]);

    let blanks = vec![Ok("   ".to_string()), Ok("\"\"".to_string())];
    let backend = ScriptedBackend::scripted_then(blanks, "a tree");
    let backoff = RecordingBackoff::default();
    let client = CaptionClient::new(&backend).with_backoff(&backoff).with_policy(policy());

    assert_eq!(client.caption(&image, "", ""), "a tree");
    assert_eq!(backend.calls(), 3);
    assert_eq!(backoff.delays().len(), 2);
}

/// Test that the request carries the fixed prompts, sampling settings and the encoded file
#[test]
fn test_request_contents() {
    let dir = TempDir::new().unwrap();
    let image = write_solid(dir.path(), "image0.png", 12, 9, [200, 10, 10]);

    let backend = ScriptedBackend::always("a red square");
    let client = CaptionClient::new(&backend).with_backoff(RecordingBackoff::default());
    client.caption(&image, "", "");

    let seen = backend.seen();
    assert_eq!(seen.len(), 1);
    let request = &seen[0];
    assert_eq!(request.system_prompt, SYSTEM_PROMPT);
    assert_eq!(request.user_prompt, USER_PROMPT);
    assert_eq!(request.max_tokens, MAX_TOKENS);
    assert_eq!(request.max_tokens, 100);
    assert!((request.temperature - TEMPERATURE).abs() < f32::EPSILON);
    assert_eq!(request.mime_type, "image/png");

    let decoded = general_purpose::STANDARD.decode(&request.image_base64).unwrap();
    assert_eq!(decoded, std::fs::read(&image).unwrap());
}

/// Test that every retry sends the same encoded image
#[test]
fn test_image_encoded_once_per_caption() {
    let dir = TempDir::new().unwrap();
    let image = write_solid(dir.path(), "image0.jpg", 16, 16, [1, 2, 3]);

    let backend = ScriptedBackend::scripted_then(vec![Err(server_error())], "ok");
    let client = CaptionClient::new(&backend)
        .with_backoff(RecordingBackoff::default())
        .with_policy(policy());
    client.caption(&image, "", "");

    let seen = backend.seen();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].image_base64, seen[1].image_base64);
}

/// Test that an unreadable image fails without contacting the backend
#[test]
fn test_missing_image_skips_backend() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("image7.jpg");

    let backend = ScriptedBackend::always("never used");
    let backoff = RecordingBackoff::default();
    let client = CaptionClient::new(&backend).with_backoff(&backoff).with_policy(policy());

    assert_eq!(client.caption(&missing, "", ""), "");
    assert_eq!(backend.calls(), 0);
    assert!(backoff.delays().is_empty());
}

/// Test that the error-returning variant surfaces the last failure
#[test]
fn test_try_caption_returns_last_error() {
    let dir = TempDir::new().unwrap();
    let image = write_solid(dir.path(), "image0.jpg", 16, 16, [10, 20, 30]);

    let backend = ScriptedBackend::scripted(vec![Err(server_error()), Err(timeout())]);
    let client = CaptionClient::new(&backend).with_backoff(RecordingBackoff::default());

    let err = client
        .try_caption(&image, "", "", RetryPolicy::new(2, Duration::ZERO))
        .unwrap_err();
    assert_eq!(err.category(), "timeout");
}
