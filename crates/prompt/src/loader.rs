//! Prompt loader for YAML prompt definitions.

use crate::types::PromptDefinition;
use cookbook_core::config::STATE_DIR;
use cookbook_core::{AppError, AppResult};
use handlebars::template::{HelperTemplate, Parameter, Template, TemplateElement};
use std::path::{Path, PathBuf};

/// Id of the recipe answering prompt.
pub const ANSWER_PROMPT_ID: &str = "recipe.answer";

const ANSWER_TEMPLATE: &str = concat!(
    "Dựa vào công thức sau, trả lời đầy đủ. KHÔNG thêm thông tin khác.\n",
    "\n",
    "Công thức:\n",
    "{{context}}\n",
    "\n",
    "Câu hỏi: {{question}}\n",
    "\n",
    "Trả lời:"
);

/// Load a prompt definition by ID from the workspace.
///
/// Searches for `<id>.yml` in the `.cookbook/prompts/` directory.
///
/// # Example
/// ```no_run
/// use cookbook_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), "recipe.answer")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = prompt_path(workspace_path, prompt_id);

    tracing::debug!("Loading prompt from: {:?}", prompt_file);

    if !prompt_file.exists() {
        return Err(AppError::Prompt(format!(
            "Prompt file not found: {:?}",
            prompt_file
        )));
    }

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse prompt YAML {:?}: {}",
            prompt_file, e
        ))
    })?;

    validate_prompt(&definition)?;

    tracing::info!("Loaded prompt: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// Load a workspace prompt, falling back to the built-in definition.
pub fn load_or_builtin(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    if prompt_path(workspace_path, prompt_id).exists() {
        return load_prompt(workspace_path, prompt_id);
    }

    tracing::debug!("No workspace prompt '{}', using built-in", prompt_id);
    builtin_prompt(prompt_id)
}

/// Get a prompt definition compiled into the binary.
pub fn builtin_prompt(prompt_id: &str) -> AppResult<PromptDefinition> {
    match prompt_id {
        ANSWER_PROMPT_ID => Ok(PromptDefinition {
            id: ANSWER_PROMPT_ID.to_string(),
            title: "Answer from a single recipe".to_string(),
            api_version: "1.0".to_string(),
            created_by: "builtin".to_string(),
            variables: vec!["context".to_string(), "question".to_string()],
            system: None,
            template: ANSWER_TEMPLATE.to_string(),
        }),
        _ => Err(AppError::Prompt(format!(
            "Unknown prompt '{}' and no file in {}/prompts",
            prompt_id, STATE_DIR
        ))),
    }
}

/// Fail unless the template references every name in `required`.
pub fn require_variables(def: &PromptDefinition, required: &[&str]) -> AppResult<()> {
    let referenced = referenced_variables(def)?;
    for name in required {
        if !referenced.iter().any(|r| r == name) {
            return Err(AppError::Prompt(format!(
                "Prompt '{}' must reference {{{{{}}}}} in its template",
                def.id, name
            )));
        }
    }
    Ok(())
}

fn prompt_path(workspace_path: &Path, prompt_id: &str) -> PathBuf {
    workspace_path
        .join(STATE_DIR)
        .join("prompts")
        .join(format!("{}.yml", prompt_id))
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    let referenced = referenced_variables(def)?;
    for variable in &def.variables {
        if !referenced.iter().any(|r| r == variable) {
            return Err(AppError::Prompt(format!(
                "Prompt '{}' must reference {{{{{}}}}} in its template",
                def.id, variable
            )));
        }
    }

    Ok(())
}

/// Names the template reads, as parsed by handlebars.
fn referenced_variables(def: &PromptDefinition) -> AppResult<Vec<String>> {
    let template = Template::compile(&def.template).map_err(|e| {
        AppError::Prompt(format!("Prompt '{}' has an invalid template: {}", def.id, e))
    })?;

    let mut names = Vec::new();
    collect_names(&template, &mut names);
    Ok(names)
}

fn collect_names(template: &Template, names: &mut Vec<String>) {
    for element in &template.elements {
        match element {
            TemplateElement::Expression(helper) | TemplateElement::HtmlExpression(helper) => {
                // `{{name}}` with no arguments is a lookup, otherwise a helper call
                if helper.params.is_empty() && helper.hash.is_empty() {
                    push_name(&helper.name, names);
                }
                push_params(helper, names);
            }
            TemplateElement::HelperBlock(helper) => {
                push_params(helper, names);
                if let Some(inner) = &helper.template {
                    collect_names(inner, names);
                }
                if let Some(inner) = &helper.inverse {
                    collect_names(inner, names);
                }
            }
            _ => {}
        }
    }
}

fn push_params(helper: &HelperTemplate, names: &mut Vec<String>) {
    for param in helper.params.iter().chain(helper.hash.values()) {
        push_name(param, names);
    }
}

fn push_name(param: &Parameter, names: &mut Vec<String>) {
    if let Some(name) = param.as_name() {
        if !name.is_empty() && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
}
