//! Optimistic send pipeline and attachment orchestration.

mod common;

use std::sync::Arc;

use chiffre_client::{AttachmentPipeline, FetchedAttachment, OutgoingFile, SendPipeline, SyncEngine};
use chiffre_shared::constants::{ATTACHMENT_MAGIC, MASTER_SECRET};
use chiffre_shared::crypto::derive_master_key;
use chiffre_shared::envelope::TextEnvelope;
use chiffre_shared::types::{AttachmentKind, ConversationId, DeliveryStatus};
use chiffre_store::KeyPolicy;

use common::{at, message_dto, session_with_policy, user_dto, FakeRemote};

#[tokio::test]
async fn plain_send_passes_text_through() {
    let remote = Arc::new(FakeRemote::default());
    let (_dir, session) = session_with_policy(KeyPolicy::Fixed);
    let pipeline = SendPipeline::new(Arc::clone(&remote), session.clone());

    let id = ConversationId::plain("u7");
    pipeline
        .send(&id, Some("bonjour".into()), None)
        .await
        .unwrap();

    let conversation = session.get_conversation(&id).unwrap();
    assert_eq!(conversation.messages.len(), 1);
    assert_eq!(conversation.messages[0].text, "bonjour");
    assert_eq!(conversation.messages[0].status, DeliveryStatus::Sent);
    assert!(conversation.messages[0].is_mine);
    assert_eq!(conversation.preview_text, "bonjour");

    let sent = remote.sent_requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].receiver_id, "u7");
    assert_eq!(sent[0].text, "bonjour");
    assert!(!sent[0].is_secret);
}

#[tokio::test]
async fn secret_send_encrypts_wire_text_but_shows_plaintext_locally() {
    let remote = Arc::new(FakeRemote::default());
    let (_dir, session) = session_with_policy(KeyPolicy::Fixed);
    let pipeline = SendPipeline::new(Arc::clone(&remote), session.clone());

    let id = ConversationId::secret("u9");
    pipeline
        .send(&id, Some("top secret".into()), None)
        .await
        .unwrap();

    // The conversation did not exist; the send created it.
    let conversation = session.get_conversation(&id).unwrap();
    assert!(conversation.is_secret);
    assert_eq!(conversation.user.id, "u9");
    assert_eq!(conversation.messages[0].text, "top secret");

    let sent = remote.sent_requests();
    assert_eq!(sent[0].receiver_id, "u9");
    assert!(sent[0].is_secret);
    assert_ne!(sent[0].text, "top secret");

    let envelope = TextEnvelope::from_wire(&sent[0].text).expect("wire text is an envelope");
    let key = derive_master_key(MASTER_SECRET);
    assert_eq!(envelope.open(&key).unwrap(), "top secret");
}

#[tokio::test]
async fn secret_attachment_is_encrypted_before_upload() {
    let remote = Arc::new(FakeRemote::default());
    let (_dir, session) = session_with_policy(KeyPolicy::Fixed);
    let pipeline = SendPipeline::new(Arc::clone(&remote), session.clone());

    let png = OutgoingFile::new("cat.png", "image/png", vec![0x89, b'P', b'N', b'G', 1, 2, 3]);
    let id = ConversationId::secret("u9");
    let message = pipeline.send(&id, None, Some(png)).await.unwrap();

    // Kind comes from the original media type, not the opaque upload.
    assert_eq!(message.attachment_kind, Some(AttachmentKind::Image));
    assert_eq!(message.attachment_url.as_deref(), Some("/uploads/cat.png.enc"));

    let uploads = remote.uploads.lock().unwrap().clone();
    assert_eq!(uploads[0].0, "cat.png.enc");
    assert_eq!(uploads[0].1, "application/octet-stream");

    let blob = remote.blobs.lock().unwrap()["/uploads/cat.png.enc"].clone();
    assert!(blob.starts_with(ATTACHMENT_MAGIC));

    let sent = remote.sent_requests();
    assert_eq!(sent[0].attachment_type, Some(AttachmentKind::Image));
}

#[tokio::test]
async fn plain_attachment_uploads_unmodified() {
    let remote = Arc::new(FakeRemote::default());
    let (_dir, session) = session_with_policy(KeyPolicy::Fixed);
    let pipeline = SendPipeline::new(Arc::clone(&remote), session.clone());

    let bytes = vec![1u8, 2, 3, 4];
    let file = OutgoingFile::new("notes.pdf", "application/pdf", bytes.clone());
    let message = pipeline
        .send(&ConversationId::plain("u7"), None, Some(file))
        .await
        .unwrap();

    assert_eq!(message.attachment_kind, Some(AttachmentKind::File));
    assert_eq!(remote.blobs.lock().unwrap()["/uploads/notes.pdf"], bytes);
    let uploads = remote.uploads.lock().unwrap().clone();
    assert_eq!(uploads[0], ("notes.pdf".to_string(), "application/pdf".to_string()));
}

#[tokio::test]
async fn attachment_round_trip_restores_bytes_and_media_type() {
    let remote = Arc::new(FakeRemote::default());
    let (_dir, session) = session_with_policy(KeyPolicy::Rotating);
    let send = SendPipeline::new(Arc::clone(&remote), session.clone());
    let attachments = AttachmentPipeline::new(Arc::clone(&remote), session.clone());

    let original = vec![9u8; 100];
    let file = OutgoingFile::new("clip.mp4", "video/mp4", original.clone());
    let message = send
        .send(&ConversationId::secret("u9"), None, Some(file))
        .await
        .unwrap();

    let fetched = attachments
        .fetch(message.attachment_url.as_deref().unwrap())
        .await
        .unwrap();
    assert_eq!(
        fetched,
        FetchedAttachment::Decrypted {
            bytes: original,
            media_type: "video/mp4".to_string(),
            kind: AttachmentKind::Video,
        }
    );
}

#[tokio::test]
async fn unencrypted_download_is_reported_as_plain() {
    let remote = Arc::new(FakeRemote::default());
    remote
        .blobs
        .lock()
        .unwrap()
        .insert("/uploads/a.gif".into(), b"GIF89a".to_vec());

    let (_dir, session) = session_with_policy(KeyPolicy::Fixed);
    let attachments = AttachmentPipeline::new(remote, session);

    let fetched = attachments.fetch("/uploads/a.gif").await.unwrap();
    assert_eq!(
        fetched,
        FetchedAttachment::Plain {
            bytes: b"GIF89a".to_vec()
        }
    );
}

#[tokio::test]
async fn dispatch_failure_marks_message_failed_but_keeps_it() {
    let remote = Arc::new(FakeRemote::default());
    remote
        .fail_send
        .store(true, std::sync::atomic::Ordering::SeqCst);

    let (_dir, session) = session_with_policy(KeyPolicy::Fixed);
    let pipeline = SendPipeline::new(Arc::clone(&remote), session.clone());

    let id = ConversationId::plain("u7");
    let message = pipeline.send(&id, Some("hello?".into()), None).await.unwrap();

    let conversation = session.get_conversation(&id).unwrap();
    assert_eq!(conversation.messages.len(), 1);
    assert_eq!(conversation.messages[0].id, message.id);
    assert_eq!(conversation.messages[0].status, DeliveryStatus::Failed);
    assert_eq!(conversation.messages[0].text, "hello?");
}

#[tokio::test]
async fn mark_read_zeroes_local_badge_and_acks_partner() {
    let remote = Arc::new(FakeRemote::with_users(vec![user_dto("u1")]));
    remote.put_messages(
        "u1",
        vec![message_dto("m1", "u1", "unread", at(0), false, DeliveryStatus::Sent, true)],
    );

    let (_dir, session) = session_with_policy(KeyPolicy::Fixed);
    SyncEngine::new(Arc::clone(&remote), session.clone())
        .sync_once()
        .await
        .unwrap();

    let id = ConversationId::secret("u1");
    assert_eq!(session.get_conversation(&id).unwrap().unread_count, 1);

    session.mark_read(remote.as_ref(), &id).await;

    assert_eq!(session.get_conversation(&id).unwrap().unread_count, 0);
    // The ack goes to the counterpart, with the secret prefix stripped.
    assert_eq!(*remote.read_acks.lock().unwrap(), vec!["u1"]);
}
