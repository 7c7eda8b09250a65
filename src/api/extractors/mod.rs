/*!
 * Request extractors
 *
 * Responsibility:
 * - handler に渡す前の取り出し/変換 (claims, path id, JSON body)
 * - rejection は AppError に揃え、エラー body の形を一つにする
 */
mod auth_claims;
mod drink_id;
mod json_body;

pub use auth_claims::AuthClaims;
pub use drink_id::DrinkId;
pub use json_body::JsonBody;
