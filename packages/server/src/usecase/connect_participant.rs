//! UseCase: 参加者接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectParticipantUseCase::execute() / join() メソッド
//! - ハンドシェイク（認証 → ルーム解決 → 認可）とルームへの登録
//!
//! ### なぜこのテストが必要か
//! - 認可されていないユーザーがルームに入れないことを保証
//! - ダイレクトルームが双方から同じキーに解決されることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：受講生・教師の教材ルーム接続、ダイレクトルーム接続
//! - 異常系：トークンなし・不正トークン、未受講、存在しない教材・相手、自分自身とのダイレクト
//! - 異常系：外部サービスの障害

use std::sync::Arc;

use crate::domain::{
    AuthorizationOracle, Identity, IdentityVerifier, PusherChannel, RoomKey, RoomRegistry,
    RoomTarget, Session, SessionIdFactory, UserDirectory, VerifyError,
};

use super::error::ConnectError;

/// A verified and authorized connection that has not joined its room yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    pub identity: Identity,
    pub room: RoomKey,
}

/// 参加者接続のユースケース
pub struct ConnectParticipantUseCase {
    verifier: Arc<dyn IdentityVerifier>,
    users: Arc<dyn UserDirectory>,
    oracle: Arc<dyn AuthorizationOracle>,
    registry: Arc<dyn RoomRegistry>,
}

impl ConnectParticipantUseCase {
    /// 新しい ConnectParticipantUseCase を作成
    pub fn new(
        verifier: Arc<dyn IdentityVerifier>,
        users: Arc<dyn UserDirectory>,
        oracle: Arc<dyn AuthorizationOracle>,
        registry: Arc<dyn RoomRegistry>,
    ) -> Self {
        Self {
            verifier,
            users,
            oracle,
            registry,
        }
    }

    /// ハンドシェイクを実行
    ///
    /// Verifies `token` before any room data is read, then resolves and
    /// authorizes the room. Nothing is registered on failure.
    pub async fn execute(
        &self,
        token: Option<&str>,
        target: RoomTarget,
    ) -> Result<Admission, ConnectError> {
        // 1. 認証
        let identity = self.authenticate(token).await?;

        // 2. ルーム解決と認可
        let room = self.authorize(&identity, target).await?;

        Ok(Admission { identity, room })
    }

    /// 認証のみを実行（ルームに依存しない API 向け）
    pub async fn authenticate(&self, token: Option<&str>) -> Result<Identity, ConnectError> {
        let token = token
            .filter(|t| !t.is_empty())
            .ok_or(ConnectError::Unauthenticated(VerifyError::MissingCredential))?;
        Ok(self.verifier.verify(token).await?)
    }

    async fn authorize(
        &self,
        identity: &Identity,
        target: RoomTarget,
    ) -> Result<RoomKey, ConnectError> {
        let caller = identity.user_id;
        match target {
            RoomTarget::Material(material_id) => {
                if !self.oracle.material_exists(material_id).await? {
                    return Err(ConnectError::MaterialNotFound(material_id.to_string()));
                }
                if !self.oracle.is_material_member(caller, material_id).await? {
                    return Err(ConnectError::Forbidden {
                        user_id: caller.value(),
                        material_id: material_id.to_string(),
                    });
                }
            }
            RoomTarget::Direct(peer) => {
                if peer == caller {
                    return Err(ConnectError::SelfDirect);
                }
                if !self.users.exists(peer).await? {
                    return Err(ConnectError::PeerNotFound(peer.value()));
                }
            }
        }
        Ok(RoomKey::resolve(target, caller))
    }

    /// 認可済みの接続をルームに登録
    ///
    /// The session receives every broadcast issued after this returns.
    pub async fn join(&self, admission: Admission, sender: PusherChannel) -> Session {
        let session = Session {
            id: SessionIdFactory::generate(),
            identity: admission.identity,
            room: admission.room,
        };
        self.registry.join(session.room, session.id, sender).await;
        session
    }
}
