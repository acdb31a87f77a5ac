use crate::builtins::{Builtins, DEFAULT_TEMPLATE};
use crate::error::{ErrorKind, Result};
use crate::profile::{Demo, Profile};
use exn::ResultExt;
use std::path::Path;
use time::format_description::well_known::Rfc3339;
use tracing::instrument;
use upon::{Engine, Template, Value};
use vitrine_assets::{AssetRecord, LoadState, SlotMap, bind};

/// The portfolio page: static [`Profile`] content plus whatever the asset
/// loader has produced so far.
///
/// The template is compiled once at construction so syntax errors surface
/// early; [`render()`](Self::render) can then be called for every state the
/// view passes through.
///
/// # Template Variables
///
/// | Variable                   | Type     | Description                                  |
/// |----------------------------|----------|----------------------------------------------|
/// | `title`                    | `String` | Document title                               |
/// | `profile.name` / `.role`   | `String` | Hero section                                 |
/// | `profile.about`            | `String` | About paragraph                              |
/// | `profile.photo`            | `String` | Portrait and favicon (`has_photo`)           |
/// | `profile.resume`           | `String` | CV download link (`has_resume`)              |
/// | `profile.contact`/`footer` | `String` | Footer lines (`has_contact`, `has_footer`)   |
/// | `profile.skills`           | `List`   | `{ name, icon, has_icon, icon_is_url }`      |
/// | `profile.projects`         | `List`   | `{ title, description, link }`               |
/// | `state.loading`            | `bool`   | Load in flight                               |
/// | `state.failed`             | `bool`   | Load failed; `state.message` is the text     |
/// | `state.ready`              | `bool`   | Load succeeded; `demos` is populated         |
/// | `demos`                    | `List`   | `{ slot, title, description, bound, ... }`   |
///
/// Every expression is HTML-escaped. A bound demo additionally carries `name`, `url`, `content_type`, `video`,
/// `size` (bytes, use `|filesize`) and `modified` (RFC 3339).
pub struct Page {
    engine: Engine<'static>,
    template: Template<'static>,
    profile: Profile,
}
impl Page {
    /// Page using the builtin template.
    pub fn new(profile: Profile) -> Result<Self> {
        Self::with_template(profile, Builtins::load(DEFAULT_TEMPLATE)?)
    }

    /// Page using a template given as source text.
    pub fn with_template(profile: Profile, source: impl Into<String>) -> Result<Self> {
        let mut engine = Engine::new();
        addons::configure(&mut engine);
        let template = engine.compile(source.into()).or_raise(|| ErrorKind::Template)?;
        Ok(Self { engine, template, profile })
    }

    /// Page using a template read from `path`.
    pub fn from_template_file(profile: Profile, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = match std::fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                exn::bail!(ErrorKind::TemplateNotFound(path.display().to_string()))
            },
            Err(e) => return Err(e).or_raise(|| ErrorKind::Io),
        };
        tracing::debug!(path = %path.display(), "Loaded user template");
        Self::with_template(profile, source)
    }

    /// Render the page for `state`, binding loaded records to `slots`.
    ///
    /// Demo panels are only populated once the state is
    /// [`Ready`](LoadState::Ready). Two records competing for one slot fail
    /// the render with [`ErrorKind::Binding`].
    #[instrument(skip_all, fields(loading = state.is_loading()))]
    pub fn render(&self, state: &LoadState, slots: &SlotMap) -> Result<String> {
        let context = self.context(state, slots)?;
        self.template.render(&self.engine, context).to_string().or_raise(|| ErrorKind::Template)
    }

    fn context(&self, state: &LoadState, slots: &SlotMap) -> Result<Value> {
        let (message, demos) = match state {
            LoadState::Loading => ("", Vec::new()),
            LoadState::Error(message) => (message.as_str(), Vec::new()),
            LoadState::Ready(records) => ("", self.demos(slots, records)?),
        };
        Ok(upon::value! {
            title: self.profile.title(),
            profile: self.profile_value(),
            state: upon::value! {
                loading: matches!(state, LoadState::Loading),
                failed: matches!(state, LoadState::Error(_)),
                ready: matches!(state, LoadState::Ready(_)),
                message: message,
            },
            demos: Value::List(demos),
        })
    }

    fn profile_value(&self) -> Value {
        let profile = &self.profile;
        let skills: Vec<Value> = profile
            .skills
            .iter()
            .map(|skill| {
                upon::value! {
                    name: skill.name.as_str(),
                    icon: skill.icon.clone().unwrap_or_default(),
                    has_icon: skill.icon.is_some(),
                    icon_is_url: skill.icon_is_url(),
                }
            })
            .collect();
        let projects: Vec<Value> = profile
            .projects
            .iter()
            .map(|project| {
                upon::value! {
                    title: project.title.as_str(),
                    description: project.description.as_str(),
                    link: project.link.as_str(),
                }
            })
            .collect();
        upon::value! {
            name: profile.name.as_str(),
            role: profile.role.as_str(),
            has_role: !profile.role.is_empty(),
            about: profile.about.as_str(),
            has_about: !profile.about.is_empty(),
            photo: profile.photo.clone().unwrap_or_default(),
            has_photo: profile.photo.is_some(),
            resume: profile.resume.clone().unwrap_or_default(),
            has_resume: profile.resume.is_some(),
            contact: profile.contact.clone().unwrap_or_default(),
            has_contact: profile.contact.is_some(),
            footer: profile.footer.clone().unwrap_or_default(),
            has_footer: profile.footer.is_some(),
            skills: Value::List(skills),
            has_skills: !profile.skills.is_empty(),
            projects: Value::List(projects),
            has_projects: !profile.projects.is_empty(),
        }
    }

    fn demos(&self, slots: &SlotMap, records: &[AssetRecord]) -> Result<Vec<Value>> {
        let bindings = bind(slots, records).or_raise(|| ErrorKind::Binding)?;
        self.profile
            .demos
            .iter()
            .map(|demo| {
                if slots.target_of(&demo.slot).is_none() {
                    tracing::warn!(slot = %demo.slot, "Demo refers to a slot with no target file");
                }
                demo_value(demo, bindings.get(&demo.slot))
            })
            .collect()
    }
}

fn demo_value(demo: &Demo, record: Option<&AssetRecord>) -> Result<Value> {
    let Some(record) = record else {
        return Ok(upon::value! {
            slot: demo.slot.as_str(),
            title: demo.title.as_str(),
            description: demo.description.as_str(),
            bound: false,
        });
    };
    let modified = record.last_modified().format(&Rfc3339).or_raise(|| ErrorKind::Template)?;
    Ok(upon::value! {
        slot: demo.slot.as_str(),
        title: demo.title.as_str(),
        description: demo.description.as_str(),
        bound: true,
        video: record.is_video(),
        name: record.name(),
        url: record.url().as_str(),
        content_type: record.content_type(),
        size: i64::try_from(record.size()).unwrap_or(i64::MAX),
        modified: modified,
    })
}

/// Custom [`upon`] extensions: HTML escaping for every expression, and a
/// `filesize` formatter for asset metadata.
mod addons {
    use upon::{Engine, Value, fmt as upon_fmt};

    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

    /// Formats a byte count with binary units, e.g. `1.5 MiB`.
    pub(super) fn human_size(bytes: u64) -> String {
        if bytes < 1024 {
            return format!("{bytes} B");
        }
        let mut size = bytes as f64;
        let mut unit = 0;
        while size >= 1024.0 && unit < UNITS.len() - 1 {
            size /= 1024.0;
            unit += 1;
        }
        format!("{size:.1} {}", UNITS[unit])
    }

    fn filesize_formatter(f: &mut upon_fmt::Formatter<'_>, value: &Value) -> upon_fmt::Result {
        match value {
            Value::Integer(bytes) if *bytes >= 0 => {
                upon_fmt::escape_html(f, &Value::String(human_size(*bytes as u64)))?
            },
            v => upon_fmt::escape_html(f, v)?,
        };
        Ok(())
    }

    /// Escapes HTML by default and registers the `filesize` formatter.
    pub(crate) fn configure(engine: &mut Engine<'_>) {
        engine.set_default_formatter(&upon_fmt::escape_html);
        engine.add_formatter("filesize", filesize_formatter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Project, Skill};
    use rstest::rstest;
    use std::sync::Arc;
    use time::macros::datetime;
    use url::Url;
    use vitrine_storage::{ObjectMeta, ObjectRef};

    fn record(name: &str, content_type: &str) -> AssetRecord {
        let object = ObjectRef::new("files", name).unwrap();
        let meta = ObjectMeta::new(1536, content_type, datetime!(2024-05-01 12:00 UTC));
        let url = Url::parse("https://cdn.test/").unwrap().join(&object.key()).unwrap();
        AssetRecord::new(&object, meta, url)
    }

    fn profile() -> Profile {
        Profile {
            name: "Ada Lovelace".into(),
            role: "Engineer".into(),
            about: "Builds things.".into(),
            skills: vec![
                Skill {
                    name: "Rust".into(),
                    icon: Some("https://cdn.test/icons/rust.svg".into()),
                },
                Skill { name: "Next UI".into(), icon: Some("UI".into()) },
                Skill { name: "SQL".into(), icon: None },
            ],
            projects: vec![Project {
                title: "Engine".into(),
                description: "Analytical.".into(),
                link: Url::parse("https://example.com/engine").unwrap(),
            }],
            demos: vec![
                Demo {
                    slot: "slotB".into(),
                    title: "Barangay".into(),
                    description: "A village directory.".into(),
                },
                Demo {
                    slot: "slotA".into(),
                    title: "Rabasorsogon".into(),
                    description: "A tourism platform.".into(),
                },
            ],
            ..Default::default()
        }
    }

    fn slots() -> SlotMap {
        SlotMap::new([("Rabasorsogon.mp4", "slotA"), ("Barangay.mp4", "slotB")]).unwrap()
    }

    fn ready(records: Vec<AssetRecord>) -> LoadState {
        LoadState::Ready(records.into())
    }

    #[test]
    fn test_renders_static_sections() {
        let html = Page::new(profile()).unwrap().render(&LoadState::Loading, &slots()).unwrap();
        assert!(html.contains("<title>Ada Lovelace</title>"));
        assert!(html.contains("Engineer"));
        assert!(html.contains(r#"<img src="https://cdn.test/icons/rust.svg""#));
        assert!(html.contains("SQL"));
        assert!(html.contains("https://example.com/engine"));
        assert!(!html.contains("Download CV"));
        assert!(!html.contains("<footer"));
        assert!(!html.contains(r#"rel="icon""#));
    }

    #[test]
    fn test_text_icon_is_not_an_image() {
        let html = Page::new(profile()).unwrap().render(&LoadState::Loading, &slots()).unwrap();
        assert!(html.contains(r#"<span class="icon">UI</span> Next UI"#));
        assert!(!html.contains(r#"src="UI""#));
    }

    #[test]
    fn test_renders_photo_resume_and_footer() {
        let profile = Profile {
            photo: Some("/profile.jpg".into()),
            resume: Some("/resume.pdf".into()),
            contact: Some("ada@example.com".into()),
            footer: Some("2023 Ada Lovelace. All rights reserved.".into()),
            ..profile()
        };
        let html = Page::new(profile).unwrap().render(&LoadState::Loading, &slots()).unwrap();
        assert!(html.contains(r#"<link rel="icon" href="/profile.jpg">"#));
        assert!(html.contains(r#"<img class="photo" src="/profile.jpg""#));
        assert!(html.contains(r#"href="/resume.pdf" download>Download CV</a>"#));
        assert!(html.contains("Contact: ada@example.com"));
        assert!(html.contains("2023 Ada Lovelace. All rights reserved."));
    }

    #[test]
    fn test_renders_loading() {
        let html = Page::new(profile()).unwrap().render(&LoadState::Loading, &slots()).unwrap();
        assert!(html.contains("Loading..."));
        assert!(!html.contains("<video"));
        assert!(!html.contains("not available"));
        assert!(!html.contains("A village directory."));
    }

    #[test]
    fn test_renders_error_message() {
        let state = LoadState::Error("Failed to load files. Please try again later.".into());
        let html = Page::new(profile()).unwrap().render(&state, &slots()).unwrap();
        assert!(html.contains("Failed to load files. Please try again later."));
        assert!(!html.contains("Loading..."));
        assert!(!html.contains("<video"));
    }

    #[test]
    fn test_renders_bound_and_empty_slots() {
        let state = ready(vec![record("Barangay.mp4", "video/mp4"), record("other.mp4", "video/mp4")]);
        let html = Page::new(profile()).unwrap().render(&state, &slots()).unwrap();
        assert!(html.contains("https://cdn.test/files/Barangay.mp4"));
        assert!(!html.contains("other.mp4"));
        assert!(html.contains("Rabasorsogon: not available."));
        assert!(html.contains("A village directory."));
        assert!(html.contains("A tourism platform."));
        assert!(html.contains("1.5 KiB"));
        assert!(html.contains("2024-05-01T12:00:00Z"));
        assert!(!html.contains("Loading..."));
    }

    #[test]
    fn test_non_video_is_linked() {
        let state = ready(vec![record("Barangay.mp4", "application/octet-stream")]);
        let html = Page::new(profile()).unwrap().render(&state, &slots()).unwrap();
        assert!(!html.contains("<video"));
        assert!(html.contains(">Barangay.mp4</a>"));
    }

    #[test]
    fn test_escapes_profile_text_and_object_names() {
        let name = r#"x"><b>.bin"#;
        let profile = Profile {
            role: "R&D".into(),
            about: "<script>alert(1)</script> & co".into(),
            demos: vec![Demo {
                slot: "raw".into(),
                title: "Raw".into(),
                description: String::new(),
            }],
            ..profile()
        };
        let slots = SlotMap::new([(name, "raw")]).unwrap();
        let state = ready(vec![record(name, "application/octet-stream")]);
        let html = Page::new(profile).unwrap().render(&state, &slots).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt; &amp; co"));
        assert!(html.contains("R&amp;D"));
        assert!(!html.contains(name));
        assert!(!html.contains("<b>"));
        assert!(html.contains("&lt;b&gt;.bin</a>"));
    }

    #[test]
    fn test_duplicate_records_fail_binding() {
        let state = ready(vec![record("Barangay.mp4", "video/mp4"), record("Barangay.mp4", "video/mp4")]);
        let err = Page::new(profile()).unwrap().render(&state, &slots()).unwrap_err();
        assert_eq!(*err, ErrorKind::Binding);
    }

    #[test]
    fn test_user_template() {
        let source = "{% if state.ready %}{% for demo in demos %}[{{ demo.slot }}]{% endfor %}{% endif %}";
        let page = Page::with_template(profile(), source).unwrap();
        assert_eq!(page.render(&LoadState::Loading, &slots()).unwrap(), "");
        let html = page.render(&LoadState::Ready(Arc::from([])), &slots()).unwrap();
        assert_eq!(html, "[slotB][slotA]");
    }

    #[test]
    fn test_template_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(&path, "<h1>{{ profile.name }}</h1>").unwrap();
        let page = Page::from_template_file(profile(), &path).unwrap();
        assert_eq!(page.render(&LoadState::Loading, &slots()).unwrap(), "<h1>Ada Lovelace</h1>");
    }

    #[test]
    fn test_missing_template_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.html");
        let err = Page::from_template_file(profile(), &path).err().unwrap();
        assert_eq!(*err, ErrorKind::TemplateNotFound(path.display().to_string()));
    }

    #[test]
    fn test_invalid_template() {
        let err = Page::with_template(profile(), "{% if %}").err().unwrap();
        assert_eq!(*err, ErrorKind::Template);
    }

    #[rstest]
    #[case(0, "0 B")]
    #[case(1023, "1023 B")]
    #[case(1024, "1.0 KiB")]
    #[case(1536, "1.5 KiB")]
    #[case(5 * 1024 * 1024, "5.0 MiB")]
    fn test_human_size(#[case] bytes: u64, #[case] expected: &str) {
        assert_eq!(addons::human_size(bytes), expected);
    }
}
