use structdiff_core::{DiffOptions, Node, PatchError};

#[test]
fn structdiff_core_readme_example() -> Result<(), Box<dyn std::error::Error>> {
    let base = Node::from_json_str(r#"{"name":"structdiff","tags":["a"],"version":1}"#)?;
    let target = Node::from_json_str(r#"{"name":"structdiff","tags":["a","b"],"version":2}"#)?;

    let diff = base.diff(&target);
    assert_eq!(diff.len(), 2);

    let wire = serde_json::to_string(&diff)?;
    println!("{wire}");
    assert!(wire.contains("\"path\":[\"version\"]"));

    let patched = base.apply_patch(&diff)?;
    assert_eq!(patched, target);
    Ok(())
}

#[test]
fn identity_readme_example() -> Result<(), Box<dyn std::error::Error>> {
    let options = DiffOptions::from_opts_json(r#"[{"setkeys":["id"]}]"#)?;
    let before = Node::from_json_str_with(r#"{"id":"42","status":"draft"}"#, &options)?;
    let after = Node::from_json_str_with(r#"{"id":"42","status":"published"}"#, &options)?;

    assert_eq!(before.identity(), after.identity());
    assert_ne!(before.content_hash(), after.content_hash());
    println!("{}", before.identity_path_element());
    Ok(())
}

#[test]
fn conflict_readme_example() -> Result<(), Box<dyn std::error::Error>> {
    let base = Node::from_json_str(r#"{"x":1}"#)?;
    let diff = base.diff(&Node::from_json_str(r#"{"x":2}"#)?);

    let diverged = Node::from_json_str(r#"{"x":5}"#)?;
    let err = diverged.patch(&diff).unwrap_err();
    assert!(matches!(err, PatchError::PatchConflict { .. }));
    assert_eq!(err.to_string(), "found 5 at [x]: expected 1");
    Ok(())
}
