/*
 * Responsibility
 * - middleware の公開インターフェース (各 module が `apply(router, ...)` を持つ)
 * - gatekeeper: 身元検証 + アクセス判定 + alias 伝播
 * - cors / http / security_headers: Router 全体に掛ける layer
 */
pub mod cors;
pub mod gatekeeper;
pub mod http;
pub mod security_headers;
