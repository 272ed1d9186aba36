use std::process::Command;

use anyhow::Result;
use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use predicates::prelude::*;
use rstest::*;

macro_rules! cargo_run {
    ($cmd:expr, $($args:expr),*) => {
        {
            let mut cmd = Command::cargo_bin($cmd)?;
            $(cmd.arg($args);)*
            cmd.assert()
        }
    };
}

/// 包含两张照片和一个无关文件的目录
#[fixture]
fn photos() -> assert_fs::TempDir {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child("nueva_cordoba_plaza_españa.jpg").write_binary(b"fake jpeg 1").unwrap();
    dir.child("sub/cosquin_festival_3.PNG").write_binary(b"fake png 2").unwrap();
    dir.child("notas.txt").write_str("no es una foto").unwrap();
    dir
}

#[rstest]
fn add_directory(photos: assert_fs::TempDir) -> Result<()> {
    let conf_dir = assert_fs::TempDir::new()?;

    cargo_run!("fotosearch", "-c", conf_dir.path(), "add", photos.path(), "--categoria", "Plazas")
        .success()
        .stdout(predicate::str::contains("indexed: 2, skipped: 0, errors: 0"));

    // 再次添加时跳过已有照片
    cargo_run!("fotosearch", "-c", conf_dir.path(), "add", photos.path(), "--categoria", "Plazas")
        .success()
        .stdout(predicate::str::contains("indexed: 0, skipped: 2, errors: 0"));

    conf_dir.child("fotosearch.db").assert(predicate::path::exists());
    conf_dir.child("images").assert(predicate::path::is_dir());

    Ok(())
}

#[rstest]
fn search_after_add(photos: assert_fs::TempDir) -> Result<()> {
    let conf_dir = assert_fs::TempDir::new()?;
    cargo_run!("fotosearch", "-c", conf_dir.path(), "add", photos.path(), "--categoria", "Plazas")
        .success();

    cargo_run!("fotosearch", "-c", conf_dir.path(), "search", "plaza españa", "--mode", "text")
        .success()
        .stdout(predicate::str::contains("nueva_cordoba_plaza_españa.jpg"))
        .stdout(predicate::str::contains("cosquin").not());

    cargo_run!(
        "fotosearch",
        "-c",
        conf_dir.path(),
        "search",
        "festival",
        "--localidad",
        "Cosquín",
        "--output-format",
        "json"
    )
    .success()
    .stdout(predicate::str::contains("\"localidad\": \"Cosquín\""))
    .stdout(predicate::str::contains("Nueva Córdoba").not());

    Ok(())
}

#[rstest]
#[case::zero("0")]
#[case::negative("-3")]
fn search_rejects_invalid_limit(#[case] limit: &str) -> Result<()> {
    let conf_dir = assert_fs::TempDir::new()?;
    cargo_run!("fotosearch", "-c", conf_dir.path(), "search", "plaza", "--limit", limit)
        .failure()
        .stderr(predicate::str::contains("limit"));
    Ok(())
}

#[rstest]
fn import_csv(photos: assert_fs::TempDir) -> Result<()> {
    let conf_dir = assert_fs::TempDir::new()?;
    let csv = conf_dir.child("metadata.csv");
    let photo = photos.child("nueva_cordoba_plaza_españa.jpg");
    csv.write_str(&format!(
        "path,barrio,localidad,categoria,descripcion\n\
         {},Nueva Córdoba,Córdoba Capital,Plazas,Plaza España\n\
         /no/existe.jpg,,Cosquín,Paisajes,[REVISAR]\n",
        photo.path().display()
    ))?;

    cargo_run!("fotosearch", "-c", conf_dir.path(), "import", csv.path())
        .success()
        .stdout(predicate::str::contains("indexed: 1, skipped: 0, errors: 1"));

    cargo_run!("fotosearch", "-c", conf_dir.path(), "stats", "--json")
        .success()
        .stdout(predicate::str::contains("\"total_imagenes\": 1"))
        .stdout(predicate::str::contains("\"pendientes_revisar\": 0"))
        .stdout(predicate::str::contains("\"categoria\": \"Plazas\""));

    cargo_run!("fotosearch", "-c", conf_dir.path(), "stats")
        .success()
        .stdout(predicate::str::contains("total: 1"))
        .stdout(predicate::str::contains("Plazas"));

    Ok(())
}
