use crate::shared::errors::{AppError, AppResult};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Webhook 署名ヘッダー名
pub const SIGNATURE_HEADER: &str = "x-line-signature";

fn mac_for(channel_secret: &str, body: &[u8]) -> AppResult<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(channel_secret.as_bytes())
        .map_err(|e| AppError::security(format!("HMAC初期化失敗: {e}")))?;
    mac.update(body);
    Ok(mac)
}

/// リクエストボディの署名を計算する
///
/// # 戻り値
/// base64(HMAC-SHA256(channel_secret, body))
pub fn sign(channel_secret: &str, body: &[u8]) -> AppResult<String> {
    let mac = mac_for(channel_secret, body)?;
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// X-Line-Signature ヘッダーを検証する
///
/// 比較は定数時間で行う
///
/// # 引数
/// * `channel_secret` - チャネルシークレット
/// * `body` - 受信した生のリクエストボディ
/// * `signature` - ヘッダーの値（None はヘッダーなし）
pub fn verify_signature(
    channel_secret: &str,
    body: &[u8],
    signature: Option<&str>,
) -> AppResult<()> {
    let signature = signature
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::security("署名ヘッダーがありません"))?;

    let expected = STANDARD
        .decode(signature)
        .map_err(|_| AppError::security("署名がbase64として不正です"))?;

    mac_for(channel_secret, body)?
        .verify_slice(&expected)
        .map_err(|_| AppError::security("署名が一致しません"))
}
