/*
 * Responsibility
 * - access: ルート規則とアクセス判定
 * - identity: トークン検証、検証済み identity、alias 伝播
 * - gatekeeper: 上記を固定順の stage pipeline で束ねる
 * - upstream: 許可されたリクエストを下流へ転送
 */
pub mod access;
pub mod gatekeeper;
pub mod identity;
pub mod upstream;
