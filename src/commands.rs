use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::io::Write;
use time::format_description::well_known::Rfc3339;
use vitrine_assets::{AssetRecord, AssetView, SlotMap, bind, load_assets};
use vitrine_page::Page;
use vitrine_storage::{ObjectStore, StoreHandle};

/// One line per record: name, size, content type, last modified, URL.
pub async fn list(store: &dyn ObjectStore, namespace: &str, out: &mut impl Write) -> Result<()> {
    let records = load_assets(store, namespace).await.or_raise(|| ErrorKind::Load)?;
    for record in &records {
        writeln!(out, "{}", record_line(record)?).or_raise(|| ErrorKind::Output)?;
    }
    tracing::info!(records = records.len(), "Listed assets");
    Ok(())
}

/// One line per slot with the file it displays, or `(empty)`.
pub async fn slots(store: &dyn ObjectStore, namespace: &str, slots: &SlotMap, out: &mut impl Write) -> Result<()> {
    let records = load_assets(store, namespace).await.or_raise(|| ErrorKind::Load)?;
    let bindings = bind(slots, &records).or_raise(|| ErrorKind::Load)?;
    for (slot, record) in bindings.iter() {
        let written = match record {
            Some(record) => writeln!(out, "{}\t{}", slot.id, record_line(record)?),
            None => writeln!(out, "{}\t{}\t(empty)", slot.id, slot.target),
        };
        written.or_raise(|| ErrorKind::Output)?;
    }
    for record in bindings.unbound() {
        tracing::debug!(name = record.name(), "Asset not shown in any slot");
    }
    Ok(())
}

/// Activate a view, wait for it to settle, and render the page.
///
/// A failed load still renders (the page shows the user-facing message), so
/// this only fails if rendering or writing does.
pub async fn render(
    store: StoreHandle,
    namespace: &str,
    page: &Page,
    slots: &SlotMap,
    out: &mut impl Write,
) -> Result<()> {
    let mut view = AssetView::activate(store, namespace);
    let state = view.settled().await;
    let html = page.render(&state, slots).or_raise(|| ErrorKind::Render)?;
    out.write_all(html.as_bytes()).or_raise(|| ErrorKind::Output)?;
    Ok(())
}

fn record_line(record: &AssetRecord) -> Result<String> {
    let modified = record.last_modified().format(&Rfc3339).or_raise(|| ErrorKind::Output)?;
    Ok(format!(
        "{}\t{}\t{}\t{}\t{}",
        record.name(),
        record.size(),
        record.content_type(),
        modified,
        record.url()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use vitrine_page::{Demo, Profile};
    use vitrine_storage::ObjectMeta;
    use vitrine_storage::backend::MockStore;

    fn store() -> MockStore {
        let updated = time::OffsetDateTime::UNIX_EPOCH;
        MockStore::default()
            .with_object("files/Barangay.mp4", ObjectMeta::new(2048, "video/mp4", updated))
            .with_object("files/notes.txt", ObjectMeta::new(5, "text/plain", updated))
    }

    fn slot_map() -> SlotMap {
        SlotMap::new([("Barangay.mp4", "barangay"), ("Rabasorsogon.mp4", "rabasorsogon")]).unwrap()
    }

    fn output(buffer: Vec<u8>) -> String {
        String::from_utf8(buffer).unwrap()
    }

    #[tokio::test]
    async fn test_list() {
        let mut out = Vec::new();
        list(&store(), "files", &mut out).await.unwrap();
        let out = output(out);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "Barangay.mp4\t2048\tvideo/mp4\t1970-01-01T00:00:00Z\thttps://mock.invalid/files/Barangay.mp4"
        );
        assert!(lines[1].starts_with("notes.txt\t5\ttext/plain\t"));
    }

    #[tokio::test]
    async fn test_list_failure() {
        let mut out = Vec::new();
        let err = list(&store().fail_listing(), "files", &mut out).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Load);
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_slots() {
        let mut out = Vec::new();
        slots(&store(), "files", &slot_map(), &mut out).await.unwrap();
        let out = output(out);
        let lines: Vec<_> = out.lines().collect();
        assert!(lines[0].starts_with("barangay\tBarangay.mp4\t2048\t"));
        assert_eq!(lines[1], "rabasorsogon\tRabasorsogon.mp4\t(empty)");
    }

    #[tokio::test]
    async fn test_render_ready() {
        let profile = Profile {
            name: "Ada".into(),
            demos: vec![Demo {
                slot: "barangay".into(),
                title: "Barangay".into(),
                description: "A village directory.".into(),
            }],
            ..Default::default()
        };
        let page = Page::new(profile).unwrap();
        let mut out = Vec::new();
        render(Arc::new(store()), "files", &page, &slot_map(), &mut out).await.unwrap();
        let html = output(out);
        assert!(html.contains("https://mock.invalid/files/Barangay.mp4"));
        assert!(html.contains("A village directory."));
        assert!(!html.contains("Loading..."));
    }

    #[tokio::test]
    async fn test_render_failed_load_shows_message() {
        let page = Page::new(Profile::default()).unwrap();
        let mut out = Vec::new();
        render(Arc::new(store().fail_listing()), "files", &page, &slot_map(), &mut out).await.unwrap();
        assert!(output(out).contains("Failed to load files. Please try again later."));
    }
}
