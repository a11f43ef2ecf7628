//! Session tokens.
//!
//! A token is `<claims>.<mac>`: base64url JSON naming the user id, followed by an
//! HMAC-SHA256 over the encoded claims. Only [`SessionCodec`] reads or writes that format.
//! Role and unit are never taken from the token; they are looked up from the user store on
//! every request, so a deleted or demoted user loses access immediately.

use crate::constants::MIN_SESSION_SECRET_LEN;
use crate::records::user::User;
use crate::records::UnitName;
use crate::repository::Actor;
use crate::roles::{Role, Scope};
use crate::{MutuError, MutuResult};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use hmac::{Hmac, Mac};
use mutu_types::{EmailAddress, NonEmptyText};
use mutu_uuid::RecordId;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use std::sync::Arc;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// The signed-in user, as returned by `GET /session`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    pub id: RecordId,
    pub name: NonEmptyText,
    pub email: EmailAddress,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<UnitName>,
}

impl SessionUser {
    pub fn scope(&self) -> Scope {
        Scope::for_user(self.role, self.unit.as_ref())
    }
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            unit: user.unit.clone(),
        }
    }
}

impl From<&SessionUser> for Actor {
    fn from(user: &SessionUser) -> Self {
        Actor {
            name: user.name.to_string(),
            role: Some(user.role),
            unit: user.unit.clone(),
            user_id: Some(user.id.clone()),
        }
    }
}

/// Key used to sign session tokens.
#[derive(Clone)]
pub struct SessionSecret(Arc<[u8]>);

impl SessionSecret {
    /// A secret of at least `MIN_SESSION_SECRET_LEN` bytes.
    pub fn new(bytes: impl AsRef<[u8]>) -> MutuResult<Self> {
        let bytes = bytes.as_ref();
        if bytes.len() < MIN_SESSION_SECRET_LEN {
            return Err(MutuError::Validation(format!(
                "session secret must be at least {MIN_SESSION_SECRET_LEN} bytes"
            )));
        }
        Ok(Self(Arc::from(bytes)))
    }

    /// A fresh random secret. Tokens signed with it do not survive a restart.
    pub fn random() -> Self {
        let mut bytes = [0u8; MIN_SESSION_SECRET_LEN];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(Arc::from(&bytes[..]))
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for SessionSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionSecret(..)")
    }
}

#[derive(Serialize, Deserialize)]
struct SessionClaims {
    id: RecordId,
}

/// Signs and verifies session tokens.
#[derive(Clone, Debug)]
pub struct SessionCodec {
    secret: SessionSecret,
}

impl SessionCodec {
    pub fn new(secret: SessionSecret) -> Self {
        Self { secret }
    }

    fn mac(&self, payload: &[u8]) -> MutuResult<Vec<u8>> {
        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| MutuError::store("initialise session mac", e))?;
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    /// Signs raw claims JSON into a token.
    pub(crate) fn sign(&self, claims: &[u8]) -> MutuResult<String> {
        let payload = URL_SAFE_NO_PAD.encode(claims);
        let signature = URL_SAFE_NO_PAD.encode(self.mac(payload.as_bytes())?);
        Ok(format!("{payload}.{signature}"))
    }

    pub fn encode(&self, user: &SessionUser) -> MutuResult<String> {
        let claims = serde_json::to_vec(&SessionClaims {
            id: user.id.clone(),
        })
        .map_err(|e| MutuError::store("serialise session", e))?;
        self.sign(&claims)
    }

    /// The user id in `token`, or `None` if there is no token or it is not one of ours.
    pub fn user_id(&self, token: Option<&str>) -> Option<RecordId> {
        let token = token?.trim();
        if token.is_empty() {
            return None;
        }

        let Some((payload, signature)) = token.split_once('.') else {
            tracing::warn!("ignoring unsigned session token");
            return None;
        };
        let Ok(signature) = URL_SAFE_NO_PAD.decode(signature) else {
            tracing::warn!("ignoring session token with an undecodable signature");
            return None;
        };
        let expected = match self.mac(payload.as_bytes()) {
            Ok(expected) => expected,
            Err(e) => {
                tracing::error!("cannot verify session token: {e}");
                return None;
            }
        };
        if !bool::from(expected.as_slice().ct_eq(signature.as_slice())) {
            tracing::warn!("ignoring session token with a bad signature");
            return None;
        }

        let bytes = match URL_SAFE_NO_PAD.decode(payload) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("ignoring undecodable session token: {e}");
                return None;
            }
        };
        match serde_json::from_slice::<SessionClaims>(&bytes) {
            Ok(claims) => Some(claims.id),
            Err(e) => {
                tracing::warn!("ignoring malformed session token: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn codec() -> SessionCodec {
        SessionCodec::new(SessionSecret::new([7u8; 32]).unwrap())
    }

    fn sample_user() -> SessionUser {
        SessionUser {
            id: RecordId::new(),
            name: NonEmptyText::new("Sari").unwrap(),
            email: EmailAddress::parse("sari@rs.example").unwrap(),
            role: Role::WardLead,
            unit: Some(UnitName::new("RANAP").unwrap()),
        }
    }

    #[test]
    fn encode_then_user_id() {
        let codec = codec();
        let user = sample_user();
        let token = codec.encode(&user).unwrap();
        assert_eq!(codec.user_id(Some(&token)), Some(user.id));
    }

    #[test]
    fn token_carries_only_the_id() {
        let token = codec().encode(&sample_user()).unwrap();
        let (payload, _) = token.split_once('.').unwrap();
        let claims: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(payload).unwrap()).unwrap();
        assert_eq!(claims.as_object().unwrap().len(), 1);
        assert!(claims.get("id").is_some());
    }

    #[test]
    fn missing_or_garbage_tokens_yield_none() {
        let codec = codec();
        assert_eq!(codec.user_id(None), None);
        assert_eq!(codec.user_id(Some("")), None);
        assert_eq!(codec.user_id(Some("%%%")), None);
        assert_eq!(codec.user_id(Some("abc.%%%")), None);

        let signed_nonsense = codec.sign(br#"{"hello":"world"}"#).unwrap();
        assert_eq!(codec.user_id(Some(&signed_nonsense)), None);
    }

    #[test]
    fn unsigned_hand_built_token_is_rejected() {
        let forged = URL_SAFE_NO_PAD.encode(
            json!({
                "id": RecordId::new().to_string(),
                "name": "Mallory",
                "email": "m@evil.example",
                "role": "Admin",
            })
            .to_string(),
        );
        assert_eq!(codec().user_id(Some(&forged)), None);
        assert_eq!(codec().user_id(Some(&format!("{forged}.AAAA"))), None);
    }

    #[test]
    fn swapped_claims_fail_the_signature_check() {
        let codec = codec();
        let token = codec.encode(&sample_user()).unwrap();
        let (_, signature) = token.split_once('.').unwrap();

        let other = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&json!({ "id": RecordId::new().to_string() })).unwrap(),
        );
        assert_eq!(codec.user_id(Some(&format!("{other}.{signature}"))), None);
    }

    #[test]
    fn token_from_another_secret_is_rejected() {
        let user = sample_user();
        let theirs = SessionCodec::new(SessionSecret::random()).encode(&user).unwrap();
        assert_eq!(codec().user_id(Some(&theirs)), None);
    }

    #[test]
    fn short_secrets_are_refused() {
        assert!(matches!(
            SessionSecret::new(b"too short"),
            Err(MutuError::Validation(_))
        ));
        assert_eq!(format!("{:?}", SessionSecret::random()), "SessionSecret(..)");
    }

    #[test]
    fn scope_follows_role_and_unit() {
        let user = sample_user();
        assert_eq!(user.scope(), Scope::Unit(UnitName::new("RANAP").unwrap()));
        let actor = Actor::from(&user);
        assert_eq!(actor.scope(), user.scope());
        assert_eq!(actor.user_id, Some(user.id));
    }
}
