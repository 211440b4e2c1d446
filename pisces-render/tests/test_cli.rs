// Allow deprecated APIs (assert_cmd::cargo_bin is deprecated but still works)
#![allow(deprecated)]

use assert_cmd::prelude::*; // Add methods on commands
use predicates::prelude::*; // Used for writing assertions
use rstest::rstest;
use std::fs::File;
use std::process::Command;
use tempfile::tempdir;

/// Width, height and RGBA bytes of a PNG file.
fn read_png(path: &std::path::Path) -> Result<(u32, u32, Vec<u8>), Box<dyn std::error::Error>> {
    let decoder = png::Decoder::new(File::open(path)?);
    let mut reader = decoder.read_info()?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    buf.truncate(info.buffer_size());
    Ok((info.width, info.height, buf))
}

#[test]
fn check_no_output() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::cargo_bin("pisces-render")?;

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Usage: pisces-render"));
    Ok(())
}

#[rstest]
#[case::defaults(&[])]
#[case::dashed(&["--dash", "6,3"])]
#[case::aliased(&["--no-antialias", "--line-width", "1"])]
#[case::thick(&["--line-width", "9", "--background", "#123"])]
fn test_render_scene(#[case] extra: &[&str]) -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let output = dir.path().join("scene.png");

    let mut cmd = Command::cargo_bin("pisces-render")?;
    cmd.arg("--width")
        .arg("200")
        .arg("--height")
        .arg("100")
        .arg("-o")
        .arg(&output)
        .args(extra);
    cmd.assert().success();

    let (width, height, rgba) = read_png(&output)?;
    assert_eq!((width, height), (200, 100));
    // something other than the background got drawn
    let first = &rgba[..4];
    assert!(rgba.chunks_exact(4).any(|px| px != first));
    Ok(())
}

#[test]
fn test_background_color() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let output = dir.path().join("bg.png");

    let mut cmd = Command::cargo_bin("pisces-render")?;
    cmd.arg("--width")
        .arg("40")
        .arg("--height")
        .arg("20")
        .arg("--background")
        .arg("rgb(10, 20, 30)")
        .arg("-o")
        .arg(&output);
    cmd.assert().success();

    let (_, _, rgba) = read_png(&output)?;
    // the top left corner lies in the padding around the first cell
    assert_eq!(&rgba[..4], &[10, 20, 30, 255]);
    Ok(())
}

#[rstest]
#[case::bad_dash(&["--dash", "4,x"], "Invalid dash length")]
#[case::zero_dash(&["--dash", "0,0"], "Invalid argument")]
#[case::bad_background(&["--background", "not-a-color"], "Invalid background color")]
#[case::bad_size(&["--width", "0"], "Invalid dimensions")]
fn test_rejects_bad_arguments(
    #[case] extra: &[&str],
    #[case] message: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempdir()?;
    let output = dir.path().join("never.png");

    let mut cmd = Command::cargo_bin("pisces-render")?;
    cmd.arg("-o").arg(&output).args(extra);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains(message));
    assert!(!output.exists());
    Ok(())
}
