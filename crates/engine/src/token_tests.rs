use super::*;
use updockly_core::test_support;

fn agent_with_hash(token: &str) -> Agent {
    let mut agent = test_support::agent("edge-1");
    agent.token_hash = hash_token(token);
    agent
}

#[test]
fn generated_tokens_are_48_chars_and_unique() {
    let a = generate_token();
    let b = generate_token();
    assert_eq!(a.len(), TOKEN_LENGTH);
    assert_ne!(a, b);
    assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
}

#[test]
fn correct_token_before_expiry_is_accepted() {
    let agent = agent_with_hash("plaintext-token");
    let now = agent.created_at;
    let verdict = verify(&agent, "plaintext-token", None, now, false);
    assert_eq!(verdict, TokenVerdict::Accepted { bind_ip: false });
}

#[test]
fn wrong_token_is_rejected() {
    let agent = agent_with_hash("plaintext-token");
    let now = agent.created_at;
    let verdict = verify(&agent, "someone-else's-token", None, now, false);
    assert_eq!(verdict, TokenVerdict::Rejected);
}

#[test]
fn expired_token_is_rejected_with_expired_verdict() {
    let mut agent = agent_with_hash("plaintext-token");
    agent.token_expires_at = agent.created_at - chrono::Duration::days(1);
    let verdict = verify(&agent, "plaintext-token", None, agent.created_at, false);
    assert_eq!(verdict, TokenVerdict::Expired);
}

#[test]
fn first_success_binds_ip_when_unbound() {
    let agent = agent_with_hash("plaintext-token");
    let now = agent.created_at;
    let verdict = verify(&agent, "plaintext-token", Some("10.0.0.5"), now, true);
    assert_eq!(verdict, TokenVerdict::Accepted { bind_ip: true });
}

#[test]
fn mismatched_bound_ip_is_rejected() {
    let mut agent = agent_with_hash("plaintext-token");
    agent.token_binding = Some("10.0.0.5".to_string());
    let now = agent.created_at;
    let verdict = verify(&agent, "plaintext-token", Some("10.0.0.9"), now, true);
    assert_eq!(verdict, TokenVerdict::Rejected);
}

#[test]
fn matching_bound_ip_is_accepted_without_rebinding() {
    let mut agent = agent_with_hash("plaintext-token");
    agent.token_binding = Some("10.0.0.5".to_string());
    let now = agent.created_at;
    let verdict = verify(&agent, "plaintext-token", Some("10.0.0.5"), now, true);
    assert_eq!(verdict, TokenVerdict::Accepted { bind_ip: false });
}
