//! Prompts for smart contract auditing

use std::borrow::Cow;

use crate::model::ContractSource;

/// Appended to source code that was cut to fit the prompt
pub const TRUNCATION_MARKER: &str = "... [truncated for length]";

/// System instruction for contract audits
pub const AUDIT_SYSTEM_INSTRUCTION: &str = r#"You are a blockchain audit assistant specialized in analyzing Ethereum and Sei-based smart contracts.
Your expertise includes identifying security vulnerabilities, logical flaws, and compliance issues in smart contract code.
Provide detailed, actionable analysis with clear recommendations for remediation."#;

const RESPONSE_TEMPLATE: &str = r#"{
  "vulnerabilities": [
    {
      "id": number,
      "name": string,
      "description": string,
      "severity": string,
      "lineNumber": number,
      "code": string,
      "recommendation": string
    }
  ],
  "overallScore": number (1-10 with 10 being most secure),
  "summary": string
}"#;

/// Cut `source` to at most `max_chars` characters, marking the cut
pub fn truncate_source(source: &str, max_chars: usize) -> Cow<'_, str> {
    match source.char_indices().nth(max_chars) {
        Some((cut, _)) => Cow::Owned(format!("{}{}", &source[..cut], TRUNCATION_MARKER)),
        None => Cow::Borrowed(source),
    }
}

/// Build the audit prompt for a contract
///
/// The source is embedded as a JSON string literal so quotes, backticks and
/// newlines in the code cannot break the surrounding prompt.
pub fn build_audit_prompt(contract: &ContractSource, max_source_chars: usize) -> String {
    let code = truncate_source(&contract.source_code, max_source_chars);
    let escaped_code = serde_json::Value::String(code.into_owned()).to_string();

    format!(
        r#"Your task is to thoroughly analyze the following smart contract and identify all potential security vulnerabilities, logic flaws, and non-compliance with standards.

Focus your analysis on:
- Common smart contract vulnerabilities (e.g., reentrancy, integer overflows/underflows, unchecked external calls)
- Denial of Service (DoS) vulnerabilities
- Misuse of delegatecall or selfdestruct, front-running, gas inefficiencies
- ERC standard compliance issues (if applicable)
- Business logic flaws (e.g., incorrect fee handling, flawed mint/burn mechanics, allowance management)
- Improper access control and trust assumptions (e.g., admin keys, unprotected critical functions)
- Use of deprecated patterns or unsafe third-party libraries
- Violations of security best practices (e.g., missing visibility specifiers, non-locked compiler versions)

Also take into account:
- Severity classification using a risk-based approach (based on likelihood and impact)
- Cross-reference of code logic with standard token behaviors and expected patterns

Contract name: {name}

Return your analysis in JSON format with the following structure:
{template}

Contract address: {address}
Compiler: {compiler}
Contract source code: {code}
"#,
        name = contract.name,
        template = RESPONSE_TEMPLATE,
        address = contract.address,
        compiler = contract.compiler,
        code = escaped_code,
    )
}
