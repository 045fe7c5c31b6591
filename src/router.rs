use crate::{
    builtins::{BuiltinHandler, BuiltinOutcome},
    classify::{classify, is_builtin, Classification, ClassificationPolicy},
    executor::{ExecutionResult, ProcessExecutor},
    output::{Control, Dispatch, LineKind},
    session::SessionState,
    translator::Translator,
};
use tracing::{debug, info, warn};

/// Turns one line of user input into output lines and control signals.
///
/// Taking the session as `&mut` keeps dispatch serialized per session: a
/// second line cannot be dispatched while one is in flight.
pub struct InputRouter {
    translator: Box<dyn Translator>,
    executor: ProcessExecutor,
    builtins: BuiltinHandler,
    policy: ClassificationPolicy,
}

impl InputRouter {
    pub fn new(translator: Box<dyn Translator>) -> Self {
        Self::with_parts(
            translator,
            ProcessExecutor::new(),
            BuiltinHandler::new(),
            ClassificationPolicy::default(),
        )
    }

    pub fn with_parts(
        translator: Box<dyn Translator>,
        executor: ProcessExecutor,
        builtins: BuiltinHandler,
        policy: ClassificationPolicy,
    ) -> Self {
        Self {
            translator,
            executor,
            builtins,
            policy,
        }
    }

    pub async fn dispatch(&self, raw_text: &str, session: &mut SessionState) -> Dispatch {
        let mut dispatch = Dispatch::default();
        let text = raw_text.trim();
        if text.is_empty() {
            return dispatch;
        }

        info!("Dispatching: {}", text);
        dispatch.push(
            LineKind::Echo,
            format!("{}$ {}", session.working_directory().display(), text),
        );

        let mut command = text.to_string();
        if session.ai_translation_enabled && !is_builtin(text, self.policy) {
            match self.translator.translate(text).await {
                Ok(translated) => {
                    dispatch.push(
                        LineKind::Interpreted,
                        format!("Interpreted as: {}", translated.text),
                    );
                    command = translated.text;
                }
                Err(e) => {
                    warn!("Translation unavailable, using raw text: {}", e);
                    dispatch.push_error(&e);
                }
            }
        }

        let classification = classify(&command, self.policy);
        debug!("Classified {:?} as {:?}", command, classification);

        match classification {
            Classification::Builtin { builtin, arg } => {
                match self.builtins.handle(builtin, arg.as_deref(), session) {
                    Ok(BuiltinOutcome::Output(lines)) => {
                        for line in lines {
                            dispatch.push(LineKind::Stdout, line);
                        }
                    }
                    Ok(BuiltinOutcome::Terminate) => dispatch.control = Some(Control::Terminate),
                    Ok(BuiltinOutcome::ClearOutput) => {
                        dispatch.control = Some(Control::ClearOutput)
                    }
                    Err(e) => dispatch.push_error(&e),
                }
            }
            Classification::External { argv } => {
                match self.executor.run(&argv, session.working_directory()).await {
                    Ok(result) => render_execution(&mut dispatch, &result),
                    Err(e) => dispatch.push_error(&e),
                }
            }
        }

        dispatch
    }
}

fn render_execution(dispatch: &mut Dispatch, result: &ExecutionResult) {
    dispatch.push_block(LineKind::Stdout, &result.stdout);
    dispatch.push_block(LineKind::Stderr, &result.stderr);
    dispatch.exit_code = result.exit_code;

    match result.exit_code {
        Some(0) => {}
        Some(code) if result.stderr.trim().is_empty() => {
            dispatch.push(LineKind::Error, format!("Command exited with status {}", code));
        }
        Some(_) => {}
        None => dispatch.push(LineKind::Error, "Command terminated by signal"),
    }
}
