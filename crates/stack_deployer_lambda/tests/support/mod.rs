#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::io::{self, Cursor, Write};
use std::path::Path;
use std::sync::Mutex;

use stack_deployer_lambda::adapters::event_bus::EventPublisher;
use stack_deployer_lambda::adapters::object_store::{ArtifactStore, StoreError};
use stack_deployer_lambda::adapters::process::CommandRunner;
use stack_deployer_lambda::config::DeployerConfig;
use stack_deployer_lambda::runtime::command::{CommandExecutionResult, CommandSpec};
use stack_deployer_lambda::runtime::events::BusEntry;
use zip::write::FileOptions;
use zip::ZipWriter;

pub const BUILT_TEMPLATE_PATH: &str = ".aws-sam/build/template.yaml";

pub fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in entries {
        zip.start_file(*name, FileOptions::default().unix_permissions(0o755))
            .expect("start file");
        zip.write_all(body).expect("write file");
    }
    zip.finish().expect("finish archive").into_inner()
}

pub fn config(staging_root: &Path) -> DeployerConfig {
    DeployerConfig {
        bucket: "deployer-artifacts".to_string(),
        event_bus_name: "deployer-bus".to_string(),
        staging_root: staging_root.to_path_buf(),
        sam_program: "sam".to_string(),
        mock_project_key: Some("mock/mock-project.zip".to_string()),
        mock_project_folder: Some("mock-project".to_string()),
        wait_for_deploy: false,
    }
}

#[derive(Default)]
pub struct MemoryStore {
    objects: HashMap<String, Vec<u8>>,
    pub downloads: Mutex<Vec<String>>,
}

impl MemoryStore {
    pub fn with(mut self, key: &str, body: Vec<u8>) -> Self {
        self.objects.insert(key.to_string(), body);
        self
    }

    pub fn downloaded(&self) -> Vec<String> {
        self.downloads.lock().expect("poisoned mutex").clone()
    }
}

impl ArtifactStore for MemoryStore {
    fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.objects.contains_key(key))
    }

    fn download(&self, key: &str, destination: &Path) -> Result<(), StoreError> {
        let body = self.objects.get(key).ok_or_else(|| StoreError::NotFound {
            key: key.to_string(),
        })?;
        self.downloads
            .lock()
            .expect("poisoned mutex")
            .push(key.to_string());
        fs::write(destination, body).map_err(|error| StoreError::Transport(error.to_string()))
    }
}

/// Records detached launches and emulates `sam build` by copying the project
/// template into the build output.
#[derive(Default)]
pub struct RecordingRunner {
    pub launched: Mutex<Vec<CommandSpec>>,
    pub ran: Mutex<Vec<CommandSpec>>,
}

impl RecordingRunner {
    pub fn launched(&self) -> Vec<CommandSpec> {
        self.launched.lock().expect("poisoned mutex").clone()
    }

    pub fn ran(&self) -> Vec<CommandSpec> {
        self.ran.lock().expect("poisoned mutex").clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, command: &CommandSpec) -> io::Result<CommandExecutionResult> {
        self.ran
            .lock()
            .expect("poisoned mutex")
            .push(command.clone());
        if command.args.first().map(String::as_str) == Some("build") {
            let output = command.working_dir.join(BUILT_TEMPLATE_PATH);
            fs::create_dir_all(output.parent().expect("output parent"))?;
            fs::copy(command.working_dir.join("template.yml"), output)?;
        }
        Ok(CommandExecutionResult {
            command: command.display(),
            stdout: Vec::new(),
            stderr: Vec::new(),
            exit_code: Some(0),
        })
    }

    fn launch(&self, command: &CommandSpec) -> io::Result<u32> {
        self.launched
            .lock()
            .expect("poisoned mutex")
            .push(command.clone());
        Ok(4242)
    }
}

#[derive(Default)]
pub struct CapturingPublisher {
    pub entries: Mutex<Vec<BusEntry>>,
}

impl CapturingPublisher {
    pub fn entries(&self) -> Vec<BusEntry> {
        self.entries.lock().expect("poisoned mutex").clone()
    }
}

impl EventPublisher for CapturingPublisher {
    fn publish(&self, entry: &BusEntry) -> Result<String, String> {
        let mut entries = self.entries.lock().expect("poisoned mutex");
        entries.push(entry.clone());
        Ok(format!("evt-{}", entries.len()))
    }
}
