use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by an access token. `token_type` discriminates access
/// tokens from anything else minted with the same secret; decoding rejects
/// a mismatch.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,
    pub role: String,
    pub is_admin: bool,
    #[serde(rename = "type")]
    pub token_type: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, is_admin: bool, ttl_minutes: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            role: if is_admin { "admin" } else { "member" }.to_string(),
            is_admin,
            token_type: "access".to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(ttl_minutes)).timestamp(),
        }
    }
}

pub fn encode_token(claims: &Claims, secret: &str) -> Result<String, String> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| format!("JWT encode failed: {e}"))
}

pub fn decode_token(token: &str, secret: &str) -> Result<Claims, String> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| format!("JWT decode failed: {e}"))?;

    if claims.token_type != "access" {
        return Err("JWT is not an access token".to_string());
    }

    Ok(claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn round_trip() {
        let claims = Claims::new(Uuid::now_v7(), true, 60);
        let token = encode_token(&claims, SECRET).unwrap();
        let decoded = decode_token(&token, SECRET).unwrap();
        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.role, "admin");
        assert!(decoded.is_admin);
    }

    #[test]
    fn member_role() {
        let claims = Claims::new(Uuid::now_v7(), false, 60);
        assert_eq!(claims.role, "member");
    }

    #[test]
    fn rejects_wrong_token_type() {
        let mut claims = Claims::new(Uuid::now_v7(), false, 60);
        claims.token_type = "refresh".to_string();
        let token = encode_token(&claims, SECRET).unwrap();
        assert!(decode_token(&token, SECRET).is_err());
    }

    #[test]
    fn rejects_expired() {
        let mut claims = Claims::new(Uuid::now_v7(), false, 60);
        claims.exp = claims.iat - 3600;
        let token = encode_token(&claims, SECRET).unwrap();
        assert!(decode_token(&token, SECRET).is_err());
    }

    #[test]
    fn rejects_wrong_secret() {
        let claims = Claims::new(Uuid::now_v7(), false, 60);
        let token = encode_token(&claims, SECRET).unwrap();
        assert!(decode_token(&token, "other-secret").is_err());
    }
}
