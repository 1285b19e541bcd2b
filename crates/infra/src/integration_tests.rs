//! Integration tests for the resolver wired to the in-memory stores.
//!
//! Tests: identity claim → AccountStore → RoleGraphStore → authority set → checks
//!
//! Verifies:
//! - The seeded USER/ADMIN hierarchy yields the expected authorities
//! - Store mutations are visible to the next resolution, with nothing cached
//! - Fail-closed behavior for unknown, inactive and unauthenticated principals
//! - One shared resolver serves concurrent requests

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tracing::Instrument;

    use nutritrack_auth::{
        Account, AccountStatus, Authority, AuthorityResolver, IdentityKey, Permission, PrincipalClaims,
        RoleNode, explain_authorization, require_any, require_permission, require_role,
    };
    use nutritrack_core::{AccountId, RoleId};

    use crate::store::{InMemoryAccountStore, InMemoryRoleGraph};

    const USER: RoleId = RoleId::new(1);
    const ADMIN: RoleId = RoleId::new(2);
    const NUTRICIONISTA: RoleId = RoleId::new(3);

    type Resolver = AuthorityResolver<Arc<InMemoryAccountStore>, Arc<InMemoryRoleGraph>>;

    fn key(email: &str) -> IdentityKey {
        IdentityKey::parse(email).unwrap()
    }

    fn seeded_graph() -> InMemoryRoleGraph {
        InMemoryRoleGraph::with_roles([
            RoleNode::new(USER, "USER")
                .with_permission(Permission::new(1, "LEER_USER_PROPIO"))
                .with_permission(Permission::new(2, "ELIMINAR_USER_PROPIO"))
                .with_permission(Permission::new(3, "MODIFICAR_INFO_PERSONAL"))
                .with_permission(Permission::new(4, "REGISTRAR_COMIDA"))
                .with_permission(Permission::new(5, "LEER_COMIDAS_PROPIAS")),
            RoleNode::new(ADMIN, "ADMIN")
                .with_permission(Permission::new(6, "LEER_USERS"))
                .with_permission(Permission::new(7, "ELIMINAR_USERS"))
                .inheriting(USER),
        ])
    }

    fn seeded_accounts() -> InMemoryAccountStore {
        InMemoryAccountStore::with_accounts([
            Account::new(AccountId::new(1), key("admin1@mournlied.com"), ADMIN),
            Account::new(AccountId::new(2), key("user1@mournlied.com"), USER),
            Account::new(AccountId::new(3), key("baja@mournlied.com"), USER).with_status(AccountStatus::Inactive),
        ])
    }

    fn setup() -> (Resolver, Arc<InMemoryAccountStore>, Arc<InMemoryRoleGraph>) {
        let accounts = Arc::new(seeded_accounts());
        let graph = Arc::new(seeded_graph());
        let resolver = AuthorityResolver::new(accounts.clone(), graph.clone());
        (resolver, accounts, graph)
    }

    #[tokio::test]
    async fn admin_inherits_user_authorities() {
        let (resolver, _, _) = setup();

        let set = resolver
            .resolve_authorities(Some("admin1@mournlied.com"))
            .await
            .unwrap();

        assert_eq!(set.len(), 9);
        assert!(set.contains("ROLE_ADMIN"));
        assert!(set.contains("ROLE_USER"));
        for perm in ["LEER_USER_PROPIO", "MODIFICAR_INFO_PERSONAL", "ELIMINAR_USER_PROPIO"] {
            assert!(set.has_permission(perm), "missing {perm}");
        }
    }

    #[tokio::test]
    async fn user_does_not_see_admin_authorities() {
        let (resolver, _, _) = setup();

        let set = resolver
            .resolve_authorities(Some("user1@mournlied.com"))
            .await
            .unwrap();

        assert_eq!(set.len(), 6);
        assert!(!set.has_role("ADMIN"));
        assert!(!set.has_permission("LEER_USERS"));
        assert!(require_role(&set, "ADMIN").is_err());
        assert!(require_permission(&set, "REGISTRAR_COMIDA").is_ok());
    }

    #[tokio::test]
    async fn claims_resolve_through_email() {
        let (resolver, _, _) = setup();

        let claims: PrincipalClaims = serde_json::from_value(serde_json::json!({
            "sub": "auth0|123",
            "email": "admin1@mournlied.com",
            "email_verified": true,
            "scope": "openid email"
        }))
        .unwrap();

        let set = resolver.resolve_claims(&claims).await.unwrap();
        assert!(require_any(&set, &[Authority::role("NUTRICIONISTA"), Authority::role("ADMIN")]).is_ok());
    }

    #[tokio::test]
    async fn fail_closed_for_unknown_inactive_and_anonymous() {
        let (resolver, _, _) = setup();

        for identity in [None, Some(""), Some("nadie@mournlied.com"), Some("baja@mournlied.com")] {
            let set = resolver.resolve_authorities(identity).await.unwrap();
            assert!(set.is_empty(), "{identity:?} should hold nothing");
        }
    }

    #[tokio::test]
    async fn deactivation_revokes_on_next_call() {
        let (resolver, accounts, _) = setup();
        let admin = key("admin1@mournlied.com");

        assert!(!resolver.resolve_identity(&admin).await.unwrap().is_empty());

        assert!(accounts.set_status(&admin, AccountStatus::Inactive).unwrap());
        assert!(resolver.resolve_identity(&admin).await.unwrap().is_empty());

        assert!(accounts.set_status(&admin, AccountStatus::Active).unwrap());
        assert_eq!(resolver.resolve_identity(&admin).await.unwrap().len(), 9);
    }

    #[tokio::test]
    async fn graph_edits_are_visible_without_restart() {
        let (resolver, accounts, graph) = setup();
        let user = key("user1@mournlied.com");

        graph
            .insert(
                RoleNode::new(NUTRICIONISTA, "NUTRICIONISTA")
                    .with_permission(Permission::new(8, "LEER_PACIENTES"))
                    .inheriting(USER),
            )
            .unwrap();
        assert!(accounts.set_base_role(&user, NUTRICIONISTA).unwrap());

        let set = resolver.resolve_identity(&user).await.unwrap();
        assert!(set.has_role("NUTRICIONISTA"));
        assert!(set.has_role("USER"));
        assert!(set.has_permission("LEER_PACIENTES"));

        // Dropping USER leaves a dangling edge from NUTRICIONISTA; its own
        // authorities still resolve.
        assert!(graph.remove(USER).unwrap().is_some());
        let set = resolver.resolve_identity(&user).await.unwrap();
        assert_eq!(set.to_strings().into_iter().collect::<Vec<_>>(), vec![
            "PERM_LEER_PACIENTES".to_string(),
            "ROLE_NUTRICIONISTA".to_string(),
        ]);
    }

    #[tokio::test]
    async fn cycle_introduced_at_runtime_terminates() {
        let (resolver, _, graph) = setup();

        assert!(graph.set_inherits(USER, [ADMIN]).unwrap());

        let closure = resolver.resolve_role_closure(USER).await.unwrap();
        assert_eq!(closure.visited.len(), 2);
        assert!(closure.dangling.is_empty());

        // Either entry point now reaches the same set.
        let from_user = resolver.resolve_identity(&key("user1@mournlied.com")).await.unwrap();
        let from_admin = resolver.resolve_identity(&key("admin1@mournlied.com")).await.unwrap();
        assert_eq!(from_user.to_strings(), from_admin.to_strings());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn shared_resolver_serves_concurrent_requests() {
        let (resolver, _, _) = setup();
        let resolver = Arc::new(resolver);

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let resolver = resolver.clone();
                let email = if i % 2 == 0 { "admin1@mournlied.com" } else { "user1@mournlied.com" };
                tokio::spawn(async move {
                    let span = nutritrack_observability::request_span(Some(email));
                    let set = resolver.resolve_authorities(Some(email)).instrument(span).await.unwrap();
                    (i, set.len())
                })
            })
            .collect();

        for handle in handles {
            let (i, len) = handle.await.unwrap();
            assert_eq!(len, if i % 2 == 0 { 9 } else { 6 });
        }
    }

    #[tokio::test]
    async fn explanation_for_denied_admin_check() {
        let (resolver, _, _) = setup();
        nutritrack_observability::init();

        let set = resolver.resolve_or_deny(Some("user1@mournlied.com")).await;
        let explanation = explain_authorization(&set, &Authority::role("ADMIN"));

        assert!(!explanation.granted);
        assert_eq!(explanation.held.len(), 6);
        let json = serde_json::to_value(&explanation).unwrap();
        assert_eq!(json["required"], "ROLE_ADMIN");
    }
}
