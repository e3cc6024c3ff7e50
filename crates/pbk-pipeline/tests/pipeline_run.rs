//! End-to-end pipeline runs over a temporary model directory.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use pbk_core::{CoreError, ExchangeDocument};
use pbk_pipeline::{
    ArtifactNames, ArtifactStore, DocumentCodec, JsonDocumentCodec, Pipeline, StageStatus,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const PFAS: &str = "\
model PBK_PFAS
  compartment Gut = 1
  compartment Blood = 5.6
  species AGut in Gut = 0
  species ABlood in Blood = 0
  BW = 70
  ka = 1.2
  kel = 0.05
  absorption: AGut -> ABlood; ka * AGut
  elimination: ABlood -> ; kel * ABlood
end
";

const CITATION: &str = "\
cff-version: 1.2.0
title: PBK model for PFAS
authors:
  - family-names: Doe
    given-names: Jane
";

struct Project {
    dir: TempDir,
}

impl Project {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("model")).unwrap();
        fs::write(dir.path().join("CITATION.cff"), CITATION).unwrap();
        Self { dir }
    }

    fn model(&self, name: &str, text: &str) -> PathBuf {
        let path = self.dir.path().join("model").join(name);
        fs::write(&path, text).unwrap();
        path
    }

    fn path(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    fn pipeline(&self) -> Pipeline {
        Pipeline::new(self.path("CITATION.cff"))
    }

    fn sources(&self) -> Vec<PathBuf> {
        Pipeline::discover(&self.path("model"), "ant").unwrap()
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn emits_full_artifact_family() {
    let project = Project::new();
    project.model("PBK_PFAS.ant", PFAS);

    let report = project.pipeline().run(&project.sources());
    let outcome = report.outcome("PBK_PFAS").unwrap();

    assert!(outcome.is_success(), "{outcome:?}");
    assert!(outcome.table_created);
    for artifact in outcome.artifacts.all() {
        assert!(artifact.is_file(), "missing {}", artifact.display());
    }

    let document = ExchangeDocument::from_json(&read(&outcome.artifacts.document)).unwrap();
    assert_eq!(document.model_id, "PBK_PFAS");
    assert_eq!(
        document.citation.as_ref().map(|c| c.title.as_str()),
        Some("PBK model for PFAS")
    );
    assert!(read(&outcome.artifacts.validation_log).contains("[INFO] - validation of 'PBK_PFAS' finished"));
}

#[test]
fn existing_annotation_table_is_never_overwritten() {
    let project = Project::new();
    project.model("PBK_PFAS.ant", PFAS);
    let pipeline = project.pipeline();
    let sources = project.sources();

    pipeline.run(&sources);
    let table_path = project.path("model/PBK_PFAS.annotations.csv");
    let curated = read(&table_path).replace(
        "BW,parameter,,,,",
        "BW,parameter,kg,bqbiol:hasProperty,http://purl.obolibrary.org/obo/PATO_0000128,body weight",
    );
    fs::write(&table_path, &curated).unwrap();

    let report = pipeline.run(&sources);
    let outcome = report.outcome("PBK_PFAS").unwrap();

    assert!(!outcome.table_created);
    assert_eq!(read(&table_path), curated);
    assert_eq!(outcome.terms_applied, 1);

    let document = ExchangeDocument::from_json(&read(&outcome.artifacts.document)).unwrap();
    let bw = document.parameter("BW").unwrap();
    assert_eq!(bw.unit.as_deref(), Some("kg"));
    assert_eq!(bw.annotations.len(), 1);
}

#[test]
fn logs_are_truncated_on_every_run() {
    let project = Project::new();
    project.model("PBK_PFAS.ant", PFAS);
    let pipeline = project.pipeline();
    let sources = project.sources();

    pipeline.run(&sources);
    let first = read(&project.path("model/PBK_PFAS.validation.log"));
    pipeline.run(&sources);
    let second = read(&project.path("model/PBK_PFAS.validation.log"));

    assert_eq!(first, second);
    assert!(read(&project.path("model/PBK_PFAS.annotations.log")).contains("using existing annotation table"));
}

#[test]
fn annotation_failure_still_validates_compiled_document() {
    let project = Project::new();
    project.model("PBK_PFAS.ant", PFAS);
    fs::remove_file(project.path("CITATION.cff")).unwrap();

    let report = project.pipeline().run(&project.sources());
    let outcome = report.outcome("PBK_PFAS").unwrap();

    assert!(matches!(outcome.annotation, StageStatus::Failed { .. }));
    assert_eq!(outcome.validation, StageStatus::Succeeded);
    assert!(outcome.table_created);
    assert!(read(&outcome.artifacts.annotation_log).contains("[ERROR] - citation metadata not readable"));
    assert!(read(&outcome.artifacts.validation_log).contains("model carries no citation metadata"));
}

#[test]
fn compile_failure_is_contained_to_its_model() {
    let project = Project::new();
    project.model("A_broken.ant", "compartment Gut = 1\nspecies AGut = 0\n");
    project.model("B_PFAS.ant", PFAS);
    project.model("notes.txt", "not a model");

    let sources = project.sources();
    assert_eq!(sources.len(), 2);

    let mut seen = Vec::new();
    let report = project
        .pipeline()
        .run_with(&sources, |outcome| seen.push(outcome.model.clone()));

    assert_eq!(seen, vec!["A_broken", "B_PFAS"]);
    assert_eq!(report.succeeded(), 1);
    assert_eq!(report.failed(), 1);

    let broken = report.outcome("A_broken").unwrap();
    assert!(
        matches!(&broken.compilation, StageStatus::Failed { message } if message.starts_with("line 2:"))
    );
    assert_eq!(broken.annotation, StageStatus::Skipped);
    assert_eq!(broken.validation, StageStatus::Skipped);
    assert!(!broken.artifacts.document.exists());
}

#[test]
fn missing_model_directory_is_reported() {
    let project = Project::new();
    assert!(Pipeline::discover(&project.path("nope"), "ant").is_err());
}

#[test]
fn source_sharing_the_document_path_is_left_untouched() {
    let project = Project::new();
    let source = project.model("PBK_PFAS.sbml", PFAS);

    let outcome = project.pipeline().process(&source);

    assert!(matches!(
        &outcome.compilation,
        StageStatus::Failed { message } if message.contains("also one of its own artifacts")
    ));
    assert_eq!(outcome.annotation, StageStatus::Skipped);
    assert_eq!(outcome.validation, StageStatus::Skipped);
    assert_eq!(read(&source), PFAS);
}

/// Artifacts held in memory; logs still go to disk.
#[derive(Clone, Default)]
struct MemoryStore {
    files: Rc<RefCell<BTreeMap<PathBuf, String>>>,
}

impl MemoryStore {
    fn insert(&self, path: PathBuf, contents: &str) {
        self.files.borrow_mut().insert(path, contents.to_string());
    }

    fn get(&self, path: &Path) -> Option<String> {
        self.files.borrow().get(path).cloned()
    }
}

impl ArtifactStore for MemoryStore {
    fn exists(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path)
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.get(path)
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, path.display().to_string()))
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        self.insert(path.to_path_buf(), contents);
        Ok(())
    }
}

struct CountingCodec {
    encoded: Rc<Cell<usize>>,
}

impl DocumentCodec for CountingCodec {
    fn encode(&self, document: &ExchangeDocument) -> Result<String, CoreError> {
        self.encoded.set(self.encoded.get() + 1);
        JsonDocumentCodec.encode(document)
    }

    fn decode(&self, content: &str) -> Result<ExchangeDocument, CoreError> {
        JsonDocumentCodec.decode(content)
    }
}

#[test]
fn artifacts_go_through_the_configured_store_and_codec() {
    let project = Project::new();
    let source = project.model("PBK_PFAS.ant", PFAS);
    let names = ArtifactNames::from_base(&source);

    let store = MemoryStore::default();
    store.insert(project.path("CITATION.cff"), CITATION);
    store.insert(
        names.annotation_table.clone(),
        "element_id,element_type,unit,qualifier,resource,description\n\
         BW,parameter,kg,bqbiol:hasProperty,http://purl.obolibrary.org/obo/PATO_0000128,body weight\n",
    );
    let encoded = Rc::new(Cell::new(0));

    let outcome = project
        .pipeline()
        .with_store(Box::new(store.clone()))
        .with_codec(Box::new(CountingCodec {
            encoded: Rc::clone(&encoded),
        }))
        .process(&source);

    assert!(outcome.is_success(), "{outcome:?}");
    assert!(!outcome.table_created);
    assert_eq!(outcome.terms_applied, 1);
    assert_eq!(encoded.get(), 2);
    assert!(!names.document.exists());
    assert!(!names.annotation_table.exists());

    let document = ExchangeDocument::from_json(&store.get(&names.document).unwrap()).unwrap();
    assert_eq!(document.parameter("BW").unwrap().unit.as_deref(), Some("kg"));
}
