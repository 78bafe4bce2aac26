#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use stepguard_harness::{config, PolicyRegistry};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
policies:
  - name: "rspec"
    forbiden_methods: [should] # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "CONFIG");
}

#[test]
fn ok_minimal_config() {
    let ok = r#"
version: 1
policies:
  - name: "rspec"
    preset: rspec_expectations
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.policies[0].name, "rspec");
}

#[test]
fn rejects_unsupported_version() {
    let bad = r#"
version: 2
policies:
  - name: "rspec"
    preset: rspec_expectations
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn rejects_structural_mistakes() {
    let cases = [
        "version: 1\n",
        "version: 1\npolicies:\n  - name: empty\n",
        "version: 1\npolicies:\n  - name: a\n    preset: rspec_expectations\n  - name: a\n    preset: rspec_expectations\n",
        "version: 1\npolicies:\n  - name: child\n    extends: parent\n  - name: parent\n    preset: rspec_expectations\n",
        "version: 1\npolicies:\n  - name: me\n    extends: me\n",
        "version: 1\npolicies:\n  - name: x\n    preset: minitest_magic\n",
    ];
    for yaml in cases {
        let err = config::load_from_str(yaml).expect_err(yaml);
        assert_eq!(err.code().as_str(), "CONFIG", "{yaml}");
    }
}

#[test]
fn registry_compiles_presets_lists_and_extends() {
    let yaml = r#"
version: 1
policies:
  - name: rspec
    preset: rspec_expectations
  - name: minitest
    forbidden_methods: [assert_equal, assert_not_equal]
    extends: rspec
  - name: alias
    extends: minitest
"#;
    let cfg = config::load_from_str(yaml).unwrap();
    let reg = PolicyRegistry::from_config(&cfg).unwrap();

    assert_eq!(reg.names(), ["rspec", "minitest", "alias"]);

    let minitest = reg.policy("minitest").unwrap();
    assert_eq!(minitest.name(), "minitest");
    for m in ["should", "should_not", "assert_equal", "assert_not_equal"] {
        assert!(minitest.contains(m), "{m}");
    }

    let alias = reg.policy("alias").unwrap();
    assert_eq!(alias.name(), "alias");
    assert_eq!(alias.len(), 4);
    assert!(reg.policy("nope").is_none());
}

#[test]
fn registry_reports_policy_name_on_compile_error() {
    let yaml = r#"
version: 1
policies:
  - name: broken
    forbidden_methods: ["as_raw"]
"#;
    let cfg = config::load_from_str(yaml).unwrap();
    let err = PolicyRegistry::from_config(&cfg).err().expect("must fail");
    assert_eq!(err.code().as_str(), "INVALID_POLICY");
    assert!(err.to_string().contains("policy=broken"), "{err}");
}

#[test]
fn sample_config_in_repo_is_valid() {
    let cfg = config::load_from_file("../../stepguard.yaml").unwrap();
    let reg = PolicyRegistry::from_config(&cfg).unwrap();
    assert!(reg.policy("rspec").is_some());
}
