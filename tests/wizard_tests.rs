//! Wizard flow tests
//!
//! Drive the state machine with key events the way the terminal loop does and
//! check the resulting steps, plans and on-disk effects.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::fs;
use std::path::{MAIN_SEPARATOR, PathBuf};
use tempfile::TempDir;

use nexus::config::{Layout, Settings};
use nexus::types::InstallerKind;
use nexus::validate::InstallerInput;
use nexus::wizard::{DirectoryStep, Outcome, PackagePlan, Step, Wizard};

struct Fixture {
    tmp: TempDir,
    wizard: Wizard,
}

impl Fixture {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let layout = Layout::new(tmp.path().join("root"));
        let settings = Settings {
            packages_dir: tmp.path().join("packages"),
        };
        let wizard = Wizard::new(layout, settings);
        Self { tmp, wizard }
    }

    fn packages(&self) -> PathBuf {
        self.tmp.path().join("packages")
    }

    fn press(&mut self, code: KeyCode) -> Outcome {
        self.wizard
            .handle_key(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            self.press(KeyCode::Char(c));
        }
    }

    fn installer(&self, file_name: &str) -> PathBuf {
        let path = self.tmp.path().join(file_name);
        fs::write(&path, b"installer").unwrap();
        path
    }

    /// Set Packages Directory -> Set Custom Directory, with the input cleared
    fn open_custom_directory(&mut self) {
        self.press(KeyCode::Down);
        self.press(KeyCode::Down);
        self.press(KeyCode::Enter);
        self.press(KeyCode::Down);
        self.press(KeyCode::Enter);
        let prefilled = self.wizard.step().text_input().unwrap().value.chars().count();
        for _ in 0..prefilled {
            self.press(KeyCode::Backspace);
        }
    }

    /// New package -> Local File -> MSI -> name
    fn start_local_msi(&mut self, name: &str) {
        self.press(KeyCode::Enter);
        self.press(KeyCode::Enter);
        self.press(KeyCode::Enter);
        self.type_text(name);
        self.press(KeyCode::Enter);
    }
}

#[test]
fn test_local_msi_flow_reaches_review() {
    let mut fx = Fixture::new();
    let msi = fx.installer("setup.msi");

    fx.start_local_msi("Test App");
    assert!(matches!(fx.wizard.step(), Step::EnterInstaller { .. }));

    fx.type_text(&msi.display().to_string());
    assert_eq!(fx.press(KeyCode::Enter), Outcome::Continue);

    let expected_dir = fx.packages().join("test-app");
    let Step::Review { plan, cursor } = fx.wizard.step() else {
        panic!("expected review, got {:?}", fx.wizard.step());
    };
    assert_eq!(*cursor, 0);
    assert_eq!(
        plan,
        &PackagePlan::New {
            name: "Test App".into(),
            kind: InstallerKind::Msi,
            input: InstallerInput::Local(msi),
            output_dir: expected_dir.clone(),
        }
    );
    assert!(expected_dir.is_dir());
    assert_eq!(
        fx.wizard.menu_options(),
        vec!["Yes, create package", "No, start over"]
    );

    match fx.press(KeyCode::Enter) {
        Outcome::Execute(plan) => assert_eq!(plan.output_dir(), expected_dir.as_path()),
        other => panic!("expected execute, got {:?}", other),
    }
}

#[test]
fn test_wrong_extension_keeps_step() {
    let mut fx = Fixture::new();
    let exe = fx.installer("setup.exe");

    fx.start_local_msi("Zoom");
    fx.type_text(&exe.display().to_string());
    fx.press(KeyCode::Enter);

    assert!(matches!(fx.wizard.step(), Step::EnterInstaller { .. }));
    assert_eq!(
        fx.wizard.validation_error(),
        Some("file must have .msi extension")
    );
    assert!(!fx.packages().join("zoom").exists());

    // Fixing the input clears the error
    let msi = fx.installer("setup.msi");
    for _ in 0..exe.display().to_string().chars().count() {
        fx.press(KeyCode::Backspace);
    }
    fx.type_text(&msi.display().to_string());
    fx.press(KeyCode::Enter);
    assert!(matches!(fx.wizard.step(), Step::Review { .. }));
    assert_eq!(fx.wizard.validation_error(), None);
}

#[test]
fn test_download_requires_https() {
    let mut fx = Fixture::new();
    fx.press(KeyCode::Enter);
    fx.press(KeyCode::Down);
    fx.press(KeyCode::Enter);
    fx.press(KeyCode::Down);
    fx.press(KeyCode::Enter);
    fx.type_text("Notepad++");
    fx.press(KeyCode::Enter);

    let Step::EnterInstaller { kind, name, .. } = fx.wizard.step() else {
        panic!("expected installer input");
    };
    assert_eq!(*kind, InstallerKind::Exe);
    assert_eq!(name, "Notepad++");

    fx.type_text("http://example.com/npp.exe");
    fx.press(KeyCode::Enter);
    assert_eq!(
        fx.wizard.validation_error(),
        Some("URL must start with 'https://'")
    );

    for _ in 0.."http://example.com/npp.exe".len() {
        fx.press(KeyCode::Backspace);
    }
    fx.type_text("https://example.com/npp.exe");
    fx.press(KeyCode::Enter);

    let Step::Review { plan, .. } = fx.wizard.step() else {
        panic!("expected review");
    };
    assert_eq!(plan.output_dir(), fx.packages().join("notepad").as_path());
}

#[test]
fn test_start_over_discards_new_package_directory() {
    let mut fx = Fixture::new();
    let msi = fx.installer("app.msi");
    fx.start_local_msi("Test App");
    fx.type_text(&msi.display().to_string());
    fx.press(KeyCode::Enter);
    assert!(fx.packages().join("test-app").is_dir());

    fx.press(KeyCode::Down);
    assert_eq!(fx.press(KeyCode::Enter), Outcome::Continue);

    assert_eq!(fx.wizard.step(), &Step::SelectOperation { cursor: 0 });
    assert!(!fx.packages().join("test-app").exists());
}

#[test]
fn test_repackage_lists_existing_packages() {
    let mut fx = Fixture::new();
    fs::create_dir_all(fx.packages().join("google-chrome")).unwrap();

    fx.press(KeyCode::Down);
    fx.press(KeyCode::Enter);
    assert!(matches!(fx.wizard.step(), Step::SelectExistingPackage { .. }));
    assert_eq!(fx.wizard.menu_options(), vec!["Google Chrome"]);

    fx.press(KeyCode::Enter);
    let Step::Review { plan, .. } = fx.wizard.step() else {
        panic!("expected review");
    };
    assert!(plan.is_repackage());
    assert_eq!(plan.name(), "Google Chrome");
    assert_eq!(
        fx.wizard.menu_options()[0],
        "Yes, repackage application"
    );

    // Starting over never deletes an existing package
    fx.press(KeyCode::Down);
    fx.press(KeyCode::Enter);
    assert!(fx.packages().join("google-chrome").is_dir());
    assert_eq!(fx.wizard.recent_packages(), ["Google Chrome"]);
}

#[test]
fn test_set_custom_packages_directory() {
    let mut fx = Fixture::new();
    fx.press(KeyCode::Down);
    fx.press(KeyCode::Down);
    fx.press(KeyCode::Enter);
    fx.press(KeyCode::Down);
    fx.press(KeyCode::Enter);

    let Step::SetDirectory(DirectoryStep::Typing { input }) = fx.wizard.step() else {
        panic!("expected directory input");
    };
    let prefilled = input.value.chars().count();
    assert!(input.value.ends_with("Packages"));

    for _ in 0..prefilled {
        fx.press(KeyCode::Backspace);
    }
    let custom = fx.tmp.path().join("custom").join("pkgs");
    fx.type_text(&custom.display().to_string());
    fx.press(KeyCode::Enter);

    assert!(matches!(fx.wizard.step(), Step::SelectOperation { .. }));
    assert_eq!(fx.wizard.packages_dir(), custom.as_path());
    assert!(custom.is_dir());

    let layout = Layout::new(fx.tmp.path().join("root"));
    let saved = Settings::load(&layout.settings_file).unwrap().unwrap();
    assert_eq!(saved.packages_dir, custom);
}

#[test]
fn test_empty_custom_directory_means_default() {
    let mut fx = Fixture::new();
    fx.press(KeyCode::Down);
    fx.press(KeyCode::Down);
    fx.press(KeyCode::Enter);
    fx.press(KeyCode::Down);
    fx.press(KeyCode::Enter);
    let prefilled = fx.wizard.step().text_input().unwrap().value.chars().count();
    for _ in 0..prefilled {
        fx.press(KeyCode::Backspace);
    }
    fx.press(KeyCode::Enter);

    let layout = Layout::new(fx.tmp.path().join("root"));
    assert_eq!(fx.wizard.packages_dir(), layout.default_packages_dir.as_path());
}

#[test]
fn test_relative_custom_directory_is_saved_absolute() {
    let mut fx = Fixture::new();
    let relative = PathBuf::from("target").join(format!("nexus-relative-pkgs-{}", std::process::id()));
    fx.open_custom_directory();
    fx.type_text(&relative.display().to_string());
    fx.press(KeyCode::Enter);

    let expected = std::env::current_dir().unwrap().join(&relative);
    assert!(matches!(fx.wizard.step(), Step::SelectOperation { .. }));
    assert_eq!(fx.wizard.packages_dir(), expected.as_path());

    let layout = Layout::new(fx.tmp.path().join("root"));
    let saved = Settings::load(&layout.settings_file).unwrap().unwrap();
    assert!(saved.packages_dir.is_absolute());
    assert_eq!(saved.packages_dir, expected);

    fs::remove_dir_all(&expected).unwrap();
}

#[test]
fn test_installer_inside_replaced_package_is_rejected() {
    let mut fx = Fixture::new();
    let existing = fx.packages().join("foo");
    fs::create_dir_all(&existing).unwrap();
    let msi = existing.join("foo.msi");
    fs::write(&msi, b"only copy").unwrap();

    fx.start_local_msi("Foo");
    fx.type_text(&msi.display().to_string());
    assert_eq!(fx.press(KeyCode::Enter), Outcome::Continue);

    assert!(matches!(fx.wizard.step(), Step::EnterInstaller { .. }));
    assert!(
        fx.wizard
            .validation_error()
            .unwrap()
            .contains("would be deleted when the package directory is replaced")
    );
    assert_eq!(fs::read(&msi).unwrap(), b"only copy");
}

#[test]
fn test_installer_in_prefix_sibling_is_rejected() {
    let mut fx = Fixture::new();
    fs::create_dir_all(fx.packages().join("foo")).unwrap();
    let sibling = fx.packages().join("foo-old");
    fs::create_dir_all(&sibling).unwrap();
    let msi = sibling.join("setup.msi");
    fs::write(&msi, b"installer").unwrap();

    fx.start_local_msi("Foo");
    fx.type_text(&msi.display().to_string());
    fx.press(KeyCode::Enter);

    assert!(fx.wizard.validation_error().is_some());
    assert!(msi.is_file());
    assert!(fx.packages().join("foo").is_dir());
}

#[test]
fn test_tab_completes_installer_path() {
    let mut fx = Fixture::new();
    let msi = fx.installer("Contoso-Setup.msi");

    fx.start_local_msi("Contoso");
    fx.type_text(&format!("{}{}cont", fx.tmp.path().display(), MAIN_SEPARATOR));
    fx.press(KeyCode::Tab);

    assert_eq!(
        fx.wizard.step().text_input().map(|i| i.value.clone()),
        Some(msi.display().to_string())
    );
}

#[test]
fn test_tab_completes_package_name() {
    let mut fx = Fixture::new();
    fx.press(KeyCode::Enter);
    fx.press(KeyCode::Enter);
    fx.press(KeyCode::Enter);
    fx.type_text("vlc");
    fx.press(KeyCode::Tab);

    assert_eq!(
        fx.wizard.step().text_input().map(|i| i.value.as_str()),
        Some("VLC Media Player")
    );
}
