//! Interactive session flow
//!
//! Resolve or establish an identity, then loop over the select/use/exit
//! menu. Only storage faults abort the loop; everything else is reported
//! and the operator is asked again.

use std::path::{Path, PathBuf};

use encrypto_core::credentials::{validate_email, validate_password, validate_username};
use encrypto_core::{
    Config, Error, FolderRegistration, FolderRegistry, IdentityService, RegisterOutcome,
    Resolution, Result, SessionCache, SignUpOutcome, TransformPipeline,
};
use tracing::{error, info, warn};

use crate::picker::FolderPicker;
use crate::prompt::Prompt;

/// Extension assumed when decoding without one
const DEFAULT_DECODE_EXTENSION: &str = "text";

/// How the session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Normal,
    NoFolderSelected,
}

impl Exit {
    pub fn code(self) -> i32 {
        match self {
            Exit::Normal => 0,
            Exit::NoFolderSelected => 1,
        }
    }
}

pub struct Session<P: Prompt, F: FolderPicker> {
    identity: IdentityService,
    registry: FolderRegistry,
    pipeline: TransformPipeline,
    prompt: P,
    picker: F,
    start_dir: PathBuf,
}

impl<P: Prompt, F: FolderPicker> Session<P, F> {
    pub fn new(config: &Config, prompt: P, picker: F) -> Self {
        Self {
            identity: IdentityService::new(config),
            registry: FolderRegistry::new(config),
            pipeline: TransformPipeline::new(&config.transform),
            prompt,
            picker,
            start_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    pub fn run(&mut self) -> Result<Exit> {
        let cache = self.authenticate()?;
        self.prompt.say(&format!("Welcome, {}!", cache.username));
        self.menu(cache.user_id)
    }

    /// Loop until the cache holds an identity the store confirms
    fn authenticate(&mut self) -> Result<SessionCache> {
        loop {
            let resolution = match self.identity.resolve() {
                Ok(resolution) => resolution,
                Err(e) => {
                    self.recover(e)?;
                    Resolution::Corrupt
                }
            };
            match resolution {
                Resolution::SignedIn(cache) => return Ok(cache),
                Resolution::NoSession => {
                    self.prompt.say("Welcome to Encrypto!");
                    self.account_flow()?;
                }
                Resolution::NotFound | Resolution::Corrupt => {
                    self.prompt.say("User not found. Please sign up or sign in.");
                    self.account_flow()?;
                }
            }
        }
    }

    fn account_flow(&mut self) -> Result<()> {
        let options = ["Sign up", "Sign in"].map(String::from);
        match self.prompt.choose("Do you want to sign up or sign in?", &options)? {
            0 => self.sign_up_flow(),
            _ => self.sign_in_flow(),
        }
    }

    fn sign_up_flow(&mut self) -> Result<()> {
        loop {
            let username = self.ask("Username", false, validate_username)?;
            let email = self.ask("Email", false, validate_email)?;
            let password = self.ask("Password", true, validate_password)?;

            let outcome = match self.identity.sign_up(&username, &email, &password) {
                Ok(outcome) => outcome,
                Err(e) => {
                    self.recover(e)?;
                    continue;
                }
            };
            match outcome {
                SignUpOutcome::Created(user) => {
                    self.prompt.say("User created successfully!");
                    self.prompt.say("Please, select a folder.");
                    self.register_flow(user.id, true)?;
                    return Ok(());
                }
                SignUpOutcome::AlreadyExists => {
                    self.prompt.say("User already exists.");
                    if self.prompt.confirm("Do you want to sign in instead?")? {
                        info!(username, "Redirecting to sign-in");
                        match self.identity.sign_in(&username, &password) {
                            Ok(true) => return Ok(()),
                            Ok(false) => {}
                            Err(e) => self.recover(e)?,
                        }
                    } else {
                        info!(username, "Retrying sign-up");
                        self.prompt
                            .say("Please try again with a different username or email.");
                    }
                }
                SignUpOutcome::Rejected(reason) => {
                    self.prompt.say(&format!("Cannot sign up: {reason}."));
                }
            }
        }
    }

    fn sign_in_flow(&mut self) -> Result<()> {
        loop {
            let username = self.ask("Username", false, validate_username)?;
            let password = self.ask("Password", true, validate_password)?;

            match self.identity.sign_in(&username, &password) {
                Ok(true) => return Ok(()),
                Ok(false) => self
                    .prompt
                    .say("Invalid username or password. Please try again."),
                Err(e) => self.recover(e)?,
            }
        }
    }

    /// Report a failed operation and carry on; storage faults propagate
    fn recover(&mut self, e: Error) -> Result<()> {
        if e.is_fatal() {
            return Err(e);
        }
        error!(error = %e, "Operation failed");
        self.prompt.say(&format!("{e}. Please try again."));
        Ok(())
    }

    /// Ask until the answer passes `validate`
    fn ask(
        &mut self,
        label: &str,
        secret: bool,
        validate: fn(&str) -> Result<()>,
    ) -> Result<String> {
        loop {
            let raw = if secret {
                self.prompt.secret(label)?
            } else {
                self.prompt.text(label)?
            };
            let answer = raw.trim().to_string();

            match validate(&answer) {
                Ok(()) => return Ok(answer),
                Err(e) => self.prompt.say(&format!("{e}. Please try again.")),
            }
        }
    }

    /// Pick and register a folder
    ///
    /// Duplicates and cache failures re-open the picker. An empty pick asks
    /// again when `required`, otherwise ends with `None`.
    fn register_flow(
        &mut self,
        owner_id: i64,
        required: bool,
    ) -> Result<Option<FolderRegistration>> {
        loop {
            let Some(path) = self.picker.pick_folder(&mut self.prompt, &self.start_dir)? else {
                if required {
                    self.prompt.say("Please select a folder to continue.");
                    continue;
                }
                return Ok(None);
            };

            match self.registry.register_folder(&path, None, owner_id) {
                Ok(RegisterOutcome::Registered(folder)) => {
                    self.prompt
                        .say(&format!("Selected folder: {}", folder.folder_path));
                    return Ok(Some(folder));
                }
                Ok(RegisterOutcome::AlreadyRegistered) => {
                    self.prompt.say(&format!(
                        "Folder {} already exists. Please select a different folder.",
                        path.display()
                    ));
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    error!(error = %e, "Failed to save folder");
                    self.prompt
                        .say("An error occurred while saving the folder. Please try again.");
                }
            }
        }
    }

    fn menu(&mut self, owner_id: i64) -> Result<Exit> {
        let options = ["Select a new folder", "Use an existing folder", "Exit"].map(String::from);
        loop {
            match self.prompt.choose("What would you like to do?", &options)? {
                0 => {
                    if self.register_flow(owner_id, false)?.is_none() {
                        self.prompt.say("No folder selected.");
                        return Ok(Exit::NoFolderSelected);
                    }
                }
                1 => self.use_flow(owner_id)?,
                _ => {
                    self.prompt.say("Exiting the application.");
                    return Ok(Exit::Normal);
                }
            }
        }
    }

    fn use_flow(&mut self, owner_id: i64) -> Result<()> {
        let cache = match self.identity.cache().load() {
            Ok(Some(cache)) if cache.user_id == owner_id => cache,
            Ok(_) | Err(Error::CacheCorruption(_)) => match self.identity.resync(owner_id) {
                Ok(cache) => cache,
                Err(e) => return self.recover(e),
            },
            Err(e) => return self.recover(e),
        };

        if cache.folders.is_empty() {
            self.prompt
                .say("No folders registered yet. Please, select a folder.");
            self.register_flow(owner_id, true)?;
            return Ok(());
        }

        let names: Vec<String> = cache.folders.iter().map(|f| f.name.clone()).collect();
        let choice = self.prompt.choose("Select a folder", &names)?;
        let Some(folder) = cache.folders.get(choice) else {
            return Ok(());
        };
        let folder = PathBuf::from(&folder.path);
        self.prompt
            .say(&format!("Using folder: {}", folder.display()));

        match self.picker.pick_file(&mut self.prompt, &folder) {
            Ok(Some(file)) => self.transform_file(&file),
            Ok(None) => Ok(()),
            Err(Error::Io(e)) => {
                warn!(error = %e, folder = %folder.display(), "Cannot list folder");
                self.prompt
                    .say(&format!("Cannot open {}: {e}", folder.display()));
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn transform_file(&mut self, file: &Path) -> Result<()> {
        let actions = ["Encrypt", "Decrypt"].map(String::from);
        let result = match self.prompt.choose("Encrypt or decrypt?", &actions)? {
            0 => self.pipeline.encode(file),
            _ => {
                let extension = self.prompt.text("Original file extension")?;
                let extension = match extension.trim() {
                    "" => DEFAULT_DECODE_EXTENSION,
                    ext => ext,
                };
                self.pipeline.decode(file, extension)
            }
        };

        match result {
            Ok(report) => {
                self.prompt.say(&format!(
                    "[{}] => {}",
                    report.sequence,
                    report.artifact.display()
                ));
                Ok(())
            }
            Err(e @ (Error::TransformPrecondition(_) | Error::Io(_))) => {
                warn!(error = %e, file = %file.display(), "Transform failed");
                self.prompt.say(&e.to_string());
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}
