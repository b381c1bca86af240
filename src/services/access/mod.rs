/*
 * Responsibility
 * - アクセス判定: 順序付きルール、最初に一致したものが勝つ、暗黙の catch-all
 * - ルール評価の前に path の正規形チェックを行う
 */
mod decision;
pub mod path;
mod rules;

pub use decision::{Decision, Rejection};
pub use rules::RuleTable;
