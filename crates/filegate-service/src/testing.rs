//! Shared fixture for service tests.

use std::path::PathBuf;
use std::sync::Arc;

use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use filegate_auth::{AccessGate, PasswordHasher, PathPolicy, RuleSet};
use filegate_core::config::app::ServerConfig;
use filegate_core::config::auth::{AuthConfig, PermissionsConfig, ScopeConfig, UserConfig};
use filegate_core::config::storage::SourceConfig;
use filegate_database::{ShareRepository, UserRepository};
use filegate_entity::access::{Rule, Subject};
use filegate_entity::share::{CommonShare, Link};
use filegate_entity::user::User;
use filegate_storage::{ChunkWriter, LocalPreviewCache, SourceManager};

use crate::context::{RequestContext, ShareActor};
use crate::download::{ArchiveBuilder, DownloadService};
use crate::file::{ChunkedUploadAssembler, UploadService};
use crate::media::MediaExtractors;
use crate::resource::ResourceService;
use crate::share::{LinkService, ShareService};

/// Source `files` laid out as
/// `docs/{a.txt, empty/, sub/{b.txt, locked.txt}}` with `locked.txt`
/// denied to everyone, plus a private source `vault`.
pub(crate) struct Fixture {
    _dir: TempDir,
    root_dir: PathBuf,
    cache: PathBuf,
    pub sources: Arc<SourceManager>,
    pub policy: Arc<PathPolicy>,
    pub gate: AccessGate,
    pub users: Arc<UserRepository>,
    pub share_repo: Arc<ShareRepository>,
    pub previews: Arc<LocalPreviewCache>,
    pub shares: ShareService,
    pub archives: ArchiveBuilder,
    pub downloads: DownloadService,
    pub uploads: UploadService,
    pub resources: ResourceService,
}

fn user(username: &str, scope: &str, permissions: PermissionsConfig) -> UserConfig {
    UserConfig {
        username: username.into(),
        scopes: vec![
            ScopeConfig {
                source: "files".into(),
                scope: scope.into(),
            },
            ScopeConfig {
                source: "vault".into(),
                scope: "/".into(),
            },
        ],
        permissions,
        ..Default::default()
    }
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let files = dir.path().join("files");
        std::fs::create_dir_all(files.join("docs/sub")).unwrap();
        std::fs::create_dir_all(files.join("docs/empty")).unwrap();
        std::fs::create_dir_all(dir.path().join("vault")).unwrap();
        std::fs::write(files.join("docs/a.txt"), "alpha").unwrap();
        std::fs::write(files.join("docs/sub/b.txt"), "bravo").unwrap();
        std::fs::write(files.join("docs/sub/locked.txt"), "secret").unwrap();
        let cache = dir.path().join("cache");

        let sources = SourceManager::from_config(&[
            SourceConfig {
                name: "files".into(),
                path: files.to_string_lossy().into_owned(),
                private: false,
                default_scope: None,
            },
            SourceConfig {
                name: "vault".into(),
                path: dir.path().join("vault").to_string_lossy().into_owned(),
                private: true,
                default_scope: None,
            },
        ])
        .unwrap();
        let sources = Arc::new(sources);
        let root = sources.get("files").unwrap().root();

        let policy = Arc::new(PathPolicy::new(
            RuleSet::builder()
                .rule(&root, Rule::allow("/", Subject::Everyone))
                .rule(&root, Rule::deny("/docs/sub/locked.txt", Subject::Everyone))
                .build(),
        ));
        let gate = AccessGate::new(Arc::clone(&policy));

        let writer = PermissionsConfig {
            download: true,
            share: true,
            create: true,
            modify: true,
            ..Default::default()
        };
        let auth = AuthConfig {
            users: vec![
                user("alice", "/", writer.clone()),
                user("bob", "/", writer.clone()),
                user(
                    "viewer",
                    "/",
                    PermissionsConfig {
                        download: true,
                        ..Default::default()
                    },
                ),
                user("noperm", "/", PermissionsConfig::default()),
                user(
                    "scoped",
                    "/docs",
                    PermissionsConfig {
                        download: true,
                        ..Default::default()
                    },
                ),
                user(
                    "admin",
                    "/",
                    PermissionsConfig {
                        admin: true,
                        ..Default::default()
                    },
                ),
            ],
            ..Default::default()
        };
        let users = Arc::new(UserRepository::from_config(&auth));
        let share_repo = Arc::new(ShareRepository::new());
        let previews = Arc::new(LocalPreviewCache::new(&cache));

        let shares = ShareService::new(
            share_repo.clone(),
            Arc::clone(&users),
            Arc::clone(&sources),
            gate.clone(),
            LinkService::new(&ServerConfig::default()),
            PasswordHasher::Bcrypt { cost: 4 },
            60,
        );
        let archives = ArchiveBuilder::new(
            Arc::clone(&sources),
            gate.clone(),
            cache.join("archives"),
            None,
        );
        let downloads = DownloadService::new(
            Arc::clone(&sources),
            gate.clone(),
            archives.clone(),
            CancellationToken::new(),
        );
        let uploads = UploadService::new(
            Arc::clone(&sources),
            gate.clone(),
            ChunkedUploadAssembler::new(ChunkWriter::new(&cache), previews.clone()),
        );
        let resources = ResourceService::new(
            Arc::clone(&sources),
            gate.clone(),
            Arc::new(MediaExtractors::new()),
        );

        Self {
            root_dir: PathBuf::from(&root),
            _dir: dir,
            cache,
            sources,
            policy,
            gate,
            users,
            share_repo,
            previews,
            shares,
            archives,
            downloads,
            uploads,
            resources,
        }
    }

    /// Real root of the `files` source.
    pub fn root(&self) -> String {
        self.root_dir.to_string_lossy().into_owned()
    }

    pub fn real(&self, relative: &str) -> PathBuf {
        self.root_dir.join(relative)
    }

    /// Directory archives are built in.
    pub fn cache_dir(&self) -> PathBuf {
        self.cache.join("archives")
    }

    pub fn user(&self, username: &str) -> Arc<User> {
        self.users.find_by_username(username).unwrap()
    }

    pub fn ctx(&self, username: &str) -> RequestContext {
        RequestContext::new(self.user(username), "127.0.0.1".into(), None)
    }

    /// An anonymous visitor of a fresh link on `path` owned by alice.
    pub fn share_actor(&self, path: &str) -> ShareActor {
        let common = CommonShare {
            source: self.root(),
            path: path.into(),
            ..Default::default()
        };
        ShareActor {
            link: Arc::new(Link::new("fixture", self.user("alice").id, 0, common)),
            viewer: None,
        }
    }

    pub fn deny_everyone(&self, prefix: &str) {
        let root = self.root();
        self.policy
            .amend(|rules| rules.push(&root, Rule::deny(prefix, Subject::Everyone)));
    }

    pub fn allow_user(&self, prefix: &str, username: &str) {
        let root = self.root();
        self.policy
            .amend(|rules| rules.push(&root, Rule::allow(prefix, Subject::User(username.into()))));
    }
}
