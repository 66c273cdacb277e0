//! Integration tests for building template families.

use std::fs;
use std::path::{Path, PathBuf};

use nubops_runner::MockRunner;
use nubops_templates::{
    resolve_symbols, BuildAction, BuildMode, FamilyBuilder, Record, RecordingSink, ScriptKind,
    Symbols, TemplateError, TemplateParser,
};
use tempfile::{tempdir, TempDir};

fn shipped_templates_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../templates")
}

fn write_file(path: &Path, text: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
}

fn example_symbols() -> Symbols {
    [
        ("environment", "production"),
        ("project", "example"),
        ("domain", "www.example.com"),
    ]
    .into_iter()
    .collect()
}

/// A family `site` with two templates and all three scripts.
fn site_family() -> TempDir {
    let temp = tempdir().unwrap();
    let family = temp.path().join("site");
    write_file(
        &family.join("a_hosts"),
        "# hosts entry\ntarget: /etc/hosts.d/${project}\n\n127.0.0.1 ${domain}\n",
    );
    write_file(
        &family.join("b_site.conf"),
        "target: /var/www/${environment}/${project}/config\nserver_name ${domain};\n",
    );
    write_file(&family.join("commands/install.sh"), "apt-get install --yes ${project}\n");
    write_file(&family.join("commands/before.sh"), "echo before ${environment}\n");
    write_file(&family.join("commands/after.sh"), "echo after ${environment}\n");
    // Nested folders other than commands are not templates.
    write_file(&family.join("docs/README"), "not a template\n");
    temp
}

#[test]
fn test_target_path_is_rebased_under_target_folder() {
    let symbols: Symbols = [("environment", "production"), ("project", "example")]
        .into_iter()
        .collect();
    let parser = TemplateParser::new(&symbols, Path::new("/tmp/out"));

    let content = parser
        .parse_str(
            Path::new("config"),
            "target: /var/www/${environment}/${project}/config\ncontent\n",
        )
        .unwrap();

    assert_eq!(
        content.target_path(),
        Path::new("/tmp/out/var/www/production/example/config")
    );
}

#[test]
fn test_substitution_replaces_symbols_and_nothing_else() {
    let temp = tempdir().unwrap();
    let template = temp.path().join("site.conf");
    let body = "server_name ${domain};  # ${project}\n\tkeep   spacing\n$$literal ${environment}\n";
    write_file(&template, &format!("target: /out.conf\n{}", body));

    let symbols = example_symbols();
    let content = TemplateParser::new(&symbols, temp.path())
        .parse_file(&template)
        .unwrap();

    assert_eq!(
        content.resolved_content(&symbols).unwrap(),
        "server_name www.example.com;  # example\n\tkeep   spacing\n$literal production\n"
    );
}

#[test]
fn test_show_runs_nothing_and_writes_nothing() {
    let family = site_family();
    let target = tempdir().unwrap();
    let runner = MockRunner::new();
    let sink = RecordingSink::new();

    let builder = FamilyBuilder::new(
        family.path(),
        "site",
        example_symbols(),
        BuildMode::Show,
        target.path(),
    )
    .unwrap();
    builder.build(&runner, &sink).unwrap();

    assert_eq!(runner.call_count(), 0);
    assert_eq!(fs::read_dir(target.path()).unwrap().count(), 0);
    assert!(sink.actions(Record::Executed).is_empty());

    let planned = sink.actions(Record::Planned);
    assert_eq!(planned.len(), 5);
    assert!(matches!(planned[0], BuildAction::RunScript { kind: ScriptKind::Install, .. }));
    assert!(matches!(planned[1], BuildAction::RunScript { kind: ScriptKind::Before, .. }));
    assert!(matches!(planned[2], BuildAction::WriteFile { .. }));
    assert!(matches!(planned[3], BuildAction::WriteFile { .. }));
    assert_eq!(
        planned[4],
        BuildAction::RunScript {
            kind: ScriptKind::After,
            content: "echo after production\n".to_string(),
        }
    );
}

#[test]
fn test_write_into_target_folder_writes_files_without_running_scripts() {
    let family = site_family();
    let target = tempdir().unwrap();
    let runner = MockRunner::new();
    let sink = RecordingSink::new();

    let builder = FamilyBuilder::new(
        family.path(),
        "site",
        example_symbols(),
        BuildMode::Write,
        target.path(),
    )
    .unwrap();
    assert_eq!(builder.build_contents().len(), 2);
    builder.build(&runner, &sink).unwrap();

    assert_eq!(runner.call_count(), 0);
    assert_eq!(
        fs::read_to_string(target.path().join("etc/hosts.d/example")).unwrap(),
        "127.0.0.1 www.example.com\n"
    );
    assert_eq!(
        fs::read_to_string(target.path().join("var/www/production/example/config")).unwrap(),
        "server_name www.example.com;\n"
    );
    assert_eq!(sink.actions(Record::Executed).len(), 2);
    assert_eq!(sink.actions(Record::Planned).len(), 3);
}

#[test]
fn test_write_fails_on_existing_target_and_overwrite_replaces_it() {
    let family = site_family();
    let target = tempdir().unwrap();
    let existing = target.path().join("etc/hosts.d/example");
    write_file(&existing, "original\n");

    let write_builder = FamilyBuilder::new(
        family.path(),
        "site",
        example_symbols(),
        BuildMode::Write,
        target.path(),
    )
    .unwrap();
    let error = write_builder
        .build(&MockRunner::new(), &RecordingSink::new())
        .unwrap_err();
    assert!(matches!(error, TemplateError::Build(_)));
    assert_eq!(fs::read_to_string(&existing).unwrap(), "original\n");

    let overwrite_builder = FamilyBuilder::new(
        family.path(),
        "site",
        example_symbols(),
        BuildMode::Overwrite,
        target.path(),
    )
    .unwrap();
    overwrite_builder
        .build(&MockRunner::new(), &RecordingSink::new())
        .unwrap();
    assert_eq!(
        fs::read_to_string(&existing).unwrap(),
        "127.0.0.1 www.example.com\n"
    );
}

#[test]
fn test_family_with_only_before_script_runs_before_only() {
    let temp = tempdir().unwrap();
    write_file(
        &temp.path().join("only-before/commands/before.sh"),
        "timedatectl set-timezone ${project}\n",
    );
    let runner = MockRunner::new();
    let sink = RecordingSink::new();

    let builder = FamilyBuilder::new(
        temp.path(),
        "only-before",
        example_symbols(),
        BuildMode::Overwrite,
        "/",
    )
    .unwrap();
    assert!(builder.build_contents().is_empty());
    assert!(builder.runs_scripts());
    builder.build(&runner, &sink).unwrap();

    assert_eq!(runner.script_names(), vec!["before"]);
    assert_eq!(runner.get_calls()[0].content, "timedatectl set-timezone example\n");
    assert_eq!(
        sink.records(),
        vec![(
            Record::Executed,
            BuildAction::RunScript {
                kind: ScriptKind::Before,
                content: "timedatectl set-timezone example\n".to_string(),
            }
        )]
    );
}

#[test]
fn test_scripts_run_in_lifecycle_order() {
    let family = site_family();
    // Scripts only run for builds into "/", so point the only template at a
    // scratch file; rebasing it under "/" leaves the path unchanged.
    let scratch = tempdir().unwrap();
    for name in ["a_hosts", "b_site.conf"] {
        fs::remove_file(family.path().join("site").join(name)).unwrap();
    }
    let scratch_target = scratch.path().join("out.conf");
    write_file(
        &family.path().join("site/out"),
        &format!("target: {}\ncontent\n", scratch_target.display()),
    );

    let runner = MockRunner::new();
    let builder = FamilyBuilder::new(
        family.path(),
        "site",
        example_symbols(),
        BuildMode::Write,
        "/",
    )
    .unwrap();
    builder.build(&runner, &RecordingSink::new()).unwrap();

    assert_eq!(runner.script_names(), vec!["install", "before", "after"]);
    assert_eq!(fs::read_to_string(&scratch_target).unwrap(), "content\n");
}

#[test]
fn test_broken_template_aborts_whole_family() {
    let family = site_family();
    write_file(&family.path().join("site/c_broken"), "foo: bar\ncontent\n");

    let error = FamilyBuilder::new(
        family.path(),
        "site",
        example_symbols(),
        BuildMode::Show,
        "/",
    )
    .unwrap_err();

    assert_eq!(
        error.to_string(),
        "c_broken:1: key is \"foo\" but must be one of: target"
    );
}

#[test]
fn test_shipped_families_build_in_show_mode() {
    let templates = shipped_templates_path();
    let families: [(&str, Vec<(&str, &str)>, &[&str]); 4] = [
        (
            "nginx-django",
            vec![
                ("environment", "test"),
                ("project", "example"),
                ("domain", "www.example.com"),
                ("project-dir", "/var/www/${environment}/${project}"),
                ("user", "www-data"),
                ("group", "www-data"),
            ],
            &["project_dir"],
        ),
        (
            "fail2ban",
            vec![
                ("ignore-ip", "127.0.0.1/8 ::1"),
                ("bantime", "1h"),
                ("findtime", "10m"),
                ("maxretry", "5"),
            ],
            &[],
        ),
        ("set-timezone", vec![("timezone", "Europe/Vienna")], &[]),
        (
            "docker-daemon",
            vec![
                ("data-root", "/var/lib/docker"),
                ("log-max-size", "10m"),
                ("log-max-file", "3"),
            ],
            &[],
        ),
    ];

    for (family, arguments, symbols_to_resolve) in families {
        let symbols = resolve_symbols(arguments, symbols_to_resolve).unwrap();
        let sink = RecordingSink::new();
        let builder =
            FamilyBuilder::new(&templates, family, symbols, BuildMode::Show, "/").unwrap();
        builder.build(&MockRunner::new(), &sink).unwrap();
        assert!(!sink.is_empty(), "family {family} did nothing");
    }
}

#[test]
fn test_shipped_nginx_site_keeps_nginx_variables() {
    let symbols = resolve_symbols(
        [
            ("environment", "test"),
            ("project", "example"),
            ("domain", "www.example.com"),
            ("project-dir", "/var/www/${environment}/${project}"),
            ("user", "www-data"),
            ("group", "www-data"),
        ],
        &["project_dir"],
    )
    .unwrap();
    let parser = TemplateParser::new(&symbols, Path::new("/"));

    let content = parser
        .parse_file(&shipped_templates_path().join("nginx_django/nginx.conf"))
        .unwrap();
    let resolved = content.resolved_content(&symbols).unwrap();

    assert_eq!(
        content.target_path(),
        Path::new("/etc/nginx/sites-available/example_test")
    );
    assert!(resolved.contains("server_name www.example.com;"));
    assert!(resolved.contains("alias /var/www/test/example/static/;"));
    assert!(resolved.contains("proxy_set_header Host $host;"));
}
