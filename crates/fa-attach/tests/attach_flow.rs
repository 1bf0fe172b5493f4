//! End-to-end attach flow over a local filesystem backend.

use std::sync::Arc;

use fa_attach::{
    AttachError, AttachRecord, AttachmentWorkflow, ManagedFileRegistry, MemoryFileRegistry,
    OptionLister, SELECT_FILE_LABEL,
};
use fa_backends::{BackendRegistry, LocalBackend, StorageBackend};
use fa_core::{resolve_directory, AttachMode, FieldAttachConfig, RequestContext, UserRef};

struct Env {
    _root: tempfile::TempDir,
    backends: BackendRegistry,
    registry: Arc<MemoryFileRegistry>,
}

async fn setup() -> Env {
    let root = tempfile::tempdir().unwrap();
    let backend = LocalBackend::new("local", root.path());

    backend
        .write("uploads/pending/Report.PDF", "%PDF-1.4 report".into())
        .await
        .unwrap();
    backend
        .write("uploads/pending/notes.txt", "plain notes".into())
        .await
        .unwrap();

    let mut backends = BackendRegistry::new();
    backends.register(Arc::new(backend));
    backends.register(Arc::new(LocalBackend::new(
        "managed",
        root.path().join("managed"),
    )));

    Env {
        _root: root,
        backends,
        registry: Arc::new(MemoryFileRegistry::new()),
    }
}

fn field(mode: AttachMode) -> FieldAttachConfig {
    FieldAttachConfig::new("local", "managed://attachments")
        .with_path("uploads/pending")
        .with_mode(mode)
        .with_extensions(["pdf"])
}

#[tokio::test]
async fn attach_copy_round_trip() {
    let env = setup().await;
    let field = field(AttachMode::Copy);
    let ctx = RequestContext::new(UserRef::new(1, "editor"));

    // Render: list the configured directory
    let dir = resolve_directory(&field, &ctx);
    let options = OptionLister::new(env.backends.clone())
        .list(&dir)
        .await
        .unwrap();

    let entries = options.entries();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].value, "");
    assert_eq!(entries[0].label, SELECT_FILE_LABEL);
    assert_eq!(entries[1].label, "notes.txt");
    assert_eq!(entries[2].label, "Report.PDF");

    // Submit: attach the report
    let workflow = AttachmentWorkflow::new(env.backends.clone(), env.registry.clone());
    let mut record = AttachRecord::new();
    let file_id = workflow
        .attach(
            "local://uploads/pending/Report.PDF",
            &options,
            &mut record,
            &field,
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(record.file_ids, vec![file_id]);

    // Source untouched, destination holds identical bytes
    let source = env.backends.get("local").unwrap();
    let managed = env.backends.get("managed").unwrap();
    assert!(source.exists("uploads/pending/Report.PDF").await.unwrap());
    assert_eq!(
        managed.read("attachments/Report.PDF").await.unwrap(),
        "%PDF-1.4 report"
    );

    let stored = env.registry.get(file_id).await.unwrap().unwrap();
    assert_eq!(stored.filename, "Report.PDF");
    assert_eq!(stored.content_type, "application/pdf");
}

#[tokio::test]
async fn attach_move_consumes_source() {
    let env = setup().await;
    let field = field(AttachMode::Move);
    let ctx = RequestContext::new(UserRef::new(1, "editor"));

    let dir = resolve_directory(&field, &ctx);
    let options = OptionLister::new(env.backends.clone())
        .list(&dir)
        .await
        .unwrap();

    let workflow = AttachmentWorkflow::new(env.backends.clone(), env.registry.clone());
    let mut record = AttachRecord::new();
    workflow
        .attach(
            "local://uploads/pending/Report.PDF",
            &options,
            &mut record,
            &field,
        )
        .await
        .unwrap();

    let source = env.backends.get("local").unwrap();
    let managed = env.backends.get("managed").unwrap();
    assert!(!source.exists("uploads/pending/Report.PDF").await.unwrap());
    assert!(managed.exists("attachments/Report.PDF").await.unwrap());
    assert_eq!(env.registry.count().await, 1);

    // The consumed file no longer lists, but stays selectable after a
    // merge with the options offered at render time
    let fresh = OptionLister::new(env.backends.clone())
        .list(&dir)
        .await
        .unwrap();
    assert_eq!(fresh.len(), 1);

    let mut merged = fresh;
    merged.merge_previous(&options);
    assert!(merged.contains("local://uploads/pending/Report.PDF"));
}

#[tokio::test]
async fn attach_rejects_disallowed_extension() {
    let env = setup().await;
    let field = field(AttachMode::Copy);
    let ctx = RequestContext::new(UserRef::new(1, "editor"));

    let dir = resolve_directory(&field, &ctx);
    let options = OptionLister::new(env.backends.clone())
        .list(&dir)
        .await
        .unwrap();

    let workflow = AttachmentWorkflow::new(env.backends.clone(), env.registry.clone());
    let mut record = AttachRecord::new();
    let result = workflow
        .attach(
            "local://uploads/pending/notes.txt",
            &options,
            &mut record,
            &field,
        )
        .await;

    assert!(matches!(
        result,
        Err(AttachError::ValidationFailed { rule: "extensions", .. })
    ));
    assert!(record.file_ids.is_empty());
    assert_eq!(env.registry.count().await, 0);

    // Source directory state is unchanged
    let source = env.backends.get("local").unwrap();
    assert!(source.exists("uploads/pending/notes.txt").await.unwrap());
}

#[tokio::test]
async fn listing_missing_directory_reports_unavailable() {
    let env = setup().await;
    let field = FieldAttachConfig::new("local", "managed://attachments").with_path("no/such/dir");
    let ctx = RequestContext::new(UserRef::new(1, "editor"));

    let dir = resolve_directory(&field, &ctx);
    let result = OptionLister::new(env.backends.clone()).list(&dir).await;

    assert!(matches!(
        result,
        Err(AttachError::BackendUnavailable { .. })
    ));
}

#[tokio::test]
async fn per_user_directory_resolution() {
    let env = setup().await;
    let source = env.backends.get("local").unwrap();
    source
        .write("homes/alice/draft.pdf", "%PDF draft".into())
        .await
        .unwrap();

    let field = FieldAttachConfig::new("local", "managed://attachments")
        .with_path("homes/[user:name]")
        .with_extensions(["pdf"]);
    let ctx = RequestContext::new(UserRef::new(9, "alice"));

    let dir = resolve_directory(&field, &ctx);
    assert_eq!(dir.to_string(), "local://homes/alice");

    let options = OptionLister::new(env.backends.clone())
        .list(&dir)
        .await
        .unwrap();
    assert_eq!(options.len(), 1);
    assert!(options.contains("local://homes/alice/draft.pdf"));
}
