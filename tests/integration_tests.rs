use hall_directory::{EtlEngine, HallPipeline, LocalStorage, TomlConfig};
use httpmock::prelude::*;
use std::io::Read;
use std::path::Path;
use tempfile::TempDir;

const HALLS_PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>Hallen</title></head>
<body>
<nav><ul><li>Start</li><li>Spielbetrieb</li></ul></nav>
<main>
<table>
  <tr><th>Kürzel</th><th>Halle / Adresse</th><th>Hinweise</th></tr>
  <tr><td>ADWG</td><td>Verbandshalle Alter Teichweg</td><td></td></tr>
  <tr><td></td><td>Alter Teichweg 200, 22049 HH</td><td></td></tr>
  <tr><td>(eh. ATW)</td><td>früher Halle am Teichweg</td><td></td></tr>
  <tr><td>BREH2</td><td>Brehmweg 60, 22527 HH</td><td>Halle 2</td></tr>
  <tr><td>PEPE 2</td><td>Sporthalle Peperkamp</td><td></td></tr>
  <tr><td></td><td>Peperkamp 15, 22111 Hamburg</td><td></td></tr>
  <tr><td>KGSE2</td><td>Siehe ADWG</td><td></td></tr>
  <tr><td>ALT</td><td>Siehe WEG</td><td></td></tr>
</table>
</main>
</body></html>"#;

const SCHEDULE: &str = "DATUM;ZEIT;HALLE;HEIM;GAST;LIGA
27.09.2025;14:00;HBV-ADWG;BSV;ETV;M10C
27.09.2025;16:00;HBV-PEPE2;SCA;BSV;M10C
04.10.2025;12:00;HBV-KGSE2;BSV;TSG;M10C
04.10.2025;14:00;Ausweichhalle;ETV;BSV;M10C
11.10.2025;10:00;HBV-BREH2;ETV;SCA;U16
";

const OVERRIDES: &str = r#"{
  "overrides": [
    {"kürzel": "BREH2", "name_bezeichnung": "Sporthalle Brehmweg"},
    {"kürzel": "NEU1", "adresse": "Teststr. 2, 20000 Hamburg", "plz": "20000", "ort": "HH"}
  ]
}"#;

struct Fixture {
    dir: TempDir,
    server: MockServer,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("spielplan.csv"), SCHEDULE).unwrap();
        std::fs::write(dir.path().join("hall_overrides.json"), OVERRIDES).unwrap();
        Self {
            dir,
            server: MockServer::start(),
        }
    }

    fn path(&self, name: &str) -> String {
        self.dir.path().join(name).display().to_string()
    }

    fn config(&self, extra: &str) -> TomlConfig {
        let content = format!(
            r#"
[source]
halls = "{halls}"
schedule = "{schedule}"

[overrides]
path = "{overrides}"

[schedule]
delimiter = ";"

[load]
output_path = "{output}"
output_formats = ["csv", "json"]
{extra}
"#,
            halls = self.server.url("/hallen/"),
            schedule = self.path("spielplan.csv"),
            overrides = self.path("hall_overrides.json"),
            output = self.path("out"),
            extra = extra,
        );
        TomlConfig::from_toml_str(&content).unwrap()
    }

    fn read_output(&self, name: &str) -> String {
        std::fs::read_to_string(Path::new(&self.path("out")).join(name)).unwrap()
    }
}

async fn run(config: TomlConfig) -> hall_directory::Result<hall_directory::core::etl::RunReport> {
    let storage = LocalStorage::new(config.load.output_path.clone());
    let pipeline = HallPipeline::new(storage, config)?;
    EtlEngine::new(pipeline).run().await
}

#[tokio::test]
async fn test_end_to_end_directory_and_schedule() {
    let fixture = Fixture::new();
    let page = fixture.server.mock(|when, then| {
        when.method(GET).path("/hallen/");
        then.status(200)
            .header("content-type", "text/html; charset=utf-8")
            .body(HALLS_PAGE);
    });

    let report = run(fixture.config("")).await.unwrap();

    page.assert();
    assert_eq!(report.halls, 5);
    assert_eq!(report.games, 5);
    // the unresolved ALT -> WEG reference
    assert_eq!(report.warnings, 1);

    let directory = fixture.read_output("hall_directory.csv");
    let lines: Vec<&str> = directory.lines().collect();
    assert_eq!(lines[0], "code,name,address,postal_code,city,extra");
    assert_eq!(
        lines[1],
        "ADWG,Verbandshalle Alter Teichweg,\"Alter Teichweg 200, 22049 HH\",22049,Hamburg,(eh. ATW) früher Halle am Teichweg"
    );
    assert_eq!(
        lines[2],
        "BREH2,Sporthalle Brehmweg,\"Brehmweg 60, 22527 HH\",22527,Hamburg,Halle 2"
    );
    assert!(lines[3].starts_with("PEPE 2,Sporthalle Peperkamp,"));
    assert!(lines[4].starts_with("KGSE2,Verbandshalle Alter Teichweg (reference: ADWG),"));
    assert_eq!(lines[5], "NEU1,,\"Teststr. 2, 20000 Hamburg\",20000,Hamburg,");
    assert!(!directory.contains("ALT,"));

    let json: serde_json::Value =
        serde_json::from_str(&fixture.read_output("hall_directory.json")).unwrap();
    assert_eq!(json.as_array().unwrap().len(), 5);
    assert_eq!(json[2]["code"], "PEPE 2");

    let schedule = fixture.read_output("schedule_with_halls.csv");
    let rows: Vec<&str> = schedule.lines().collect();
    assert_eq!(
        rows[0],
        "date,time,raw_hall_label,code,city,postal_code,address,home,away"
    );
    assert_eq!(rows.len(), 6);
    assert!(rows[2].contains(",PEPE 2,Hamburg,22111,"));
    assert!(rows[3].contains(",KGSE2,Hamburg,22049,"));
    assert_eq!(rows[4], "04.10.2025,14:00,Ausweichhalle,,,,,ETV,BSV");
}

#[tokio::test]
async fn test_schedule_filter_and_zip_bundle() {
    let fixture = Fixture::new();
    fixture.server.mock(|when, then| {
        when.method(GET).path("/hallen/");
        then.status(200).body(HALLS_PAGE);
    });

    let mut config = fixture.config("\n[load.compression]\nenabled = true\nfilename = \"hallen.zip\"\n");
    config.schedule.league = Some("M10C".to_string());
    config.schedule.team = Some("SCA".to_string());

    let report = run(config).await.unwrap();

    assert!(report.output_path.ends_with("hallen.zip"));
    assert_eq!(report.games, 1);

    let zip_data = std::fs::read(&report.output_path).unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
    assert_eq!(archive.len(), 4);

    let mut schedule = String::new();
    archive
        .by_name("schedule_with_halls.csv")
        .unwrap()
        .read_to_string(&mut schedule)
        .unwrap();
    assert_eq!(schedule.lines().count(), 2);
    assert!(schedule.contains("HBV-PEPE2"));
    assert!(!Path::new(&fixture.path("out")).join("hall_directory.csv").exists());
}

#[tokio::test]
async fn test_missing_override_file_still_produces_directory() {
    let fixture = Fixture::new();
    fixture.server.mock(|when, then| {
        when.method(GET).path("/hallen/");
        then.status(200).body(HALLS_PAGE);
    });
    std::fs::remove_file(fixture.path("hall_overrides.json")).unwrap();

    let report = run(fixture.config("")).await.unwrap();

    assert_eq!(report.halls, 4);
    let directory = fixture.read_output("hall_directory.csv");
    assert!(directory.contains("BREH2,,\"Brehmweg 60, 22527 HH\",22527,Hamburg,Halle 2"));
    assert!(!directory.contains("NEU1"));
}

#[tokio::test]
async fn test_corrupt_override_file_is_not_fatal() {
    let fixture = Fixture::new();
    fixture.server.mock(|when, then| {
        when.method(GET).path("/hallen/");
        then.status(200).body(HALLS_PAGE);
    });
    std::fs::write(fixture.path("hall_overrides.json"), "{ \"overrides\": [").unwrap();

    let report = run(fixture.config("")).await.unwrap();

    assert_eq!(report.halls, 4);
    assert_eq!(report.warnings, 2);
}

#[tokio::test]
async fn test_unreachable_halls_page_fails_the_run() {
    let fixture = Fixture::new();
    fixture.server.mock(|when, then| {
        when.method(GET).path("/hallen/");
        then.status(500);
    });

    let err = run(fixture.config("")).await.unwrap_err();

    assert_eq!(
        err.severity(),
        hall_directory::utils::error::ErrorSeverity::Medium
    );
    assert!(!Path::new(&fixture.path("out")).exists());
}
