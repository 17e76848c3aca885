//! User-facing text catalogs.
//!
//! Every string that reaches an end user or the model (refusals, notices,
//! prompts, tool result wording) lives here, once per locale. Templates use
//! `{{name}}` placeholders filled with [`fill`].

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::error::PagebriefError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Locale {
    #[default]
    #[serde(rename = "en")]
    En,
    #[serde(rename = "zh-tw")]
    ZhTw,
}

impl FromStr for Locale {
    type Err = PagebriefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "en" | "en-us" => Ok(Locale::En),
            "zh-tw" | "zh-hant" => Ok(Locale::ZhTw),
            other => Err(PagebriefError::ConfigError(format!(
                "Unknown locale '{}'. Use en or zh-tw",
                other
            ))),
        }
    }
}

/// One locale's worth of text
#[derive(Debug)]
pub struct Messages {
    pub unknown_title: &'static str,
    pub notice_incomplete: &'static str,
    pub notice_special: &'static str,
    pub refuse_not_enough: &'static str,
    /// `{{reason}}`
    pub refuse_with_reason: &'static str,
    pub refuse_fetch_failed: &'static str,
    pub refuse_render_failed: &'static str,
    pub refuse_summary_failed: &'static str,
    pub agent_no_reply: &'static str,
    pub agent_round_limit: &'static str,
    pub agent_model_failed: &'static str,
    /// `{{name}}`
    pub unknown_tool: &'static str,
    /// `{{url}}`
    pub summarize_instruction: &'static str,
    /// `{{title}}`, `{{url}}`, `{{content}}`
    pub summary_prompt: &'static str,
    /// `{{now}}`
    pub system_prompt: &'static str,
    /// `{{query}}`
    pub search_no_results: &'static str,
    pub search_failed: &'static str,
    pub search_abstract: &'static str,
    pub search_source: &'static str,
    pub search_related: &'static str,
    /// `{{ext}}`
    pub file_unsupported: &'static str,
    /// `{{size}}`
    pub file_too_large: &'static str,
    /// `{{status}}`
    pub file_http_status: &'static str,
    pub file_download_failed: &'static str,
    /// `{{url}}`
    pub file_image_instruction: &'static str,
    /// `{{url}}`
    pub file_pdf_instruction: &'static str,
    /// `{{url}}`
    pub file_office_unsupported: &'static str,
}

static EN: Messages = Messages {
    unknown_title: "Unknown title",
    notice_incomplete: "🔄 The page content looks incomplete, switching to browser-rendering mode. Please wait...",
    notice_special: "🔄 This page needs special handling, switching to browser-rendering mode. Please wait...",
    refuse_not_enough: "Could not extract enough content from this page to summarize. The page may require JavaScript rendering.",
    refuse_with_reason: "Could not summarize this page. Reason: {{reason}}",
    refuse_fetch_failed: "Could not load this page. It may be unreachable or blocking automated access.",
    refuse_render_failed: "Could not summarize this page: browser rendering failed and no static content was available.",
    refuse_summary_failed: "Could not summarize this page right now. Please try again later.",
    agent_no_reply: "Sorry, I couldn't produce a reply.",
    agent_round_limit: "Sorry, I stopped after too many tool steps without reaching an answer. Please try rephrasing your request.",
    agent_model_failed: "Sorry, I couldn't reach the language model. Please try again later.",
    unknown_tool: "Unknown tool: {{name}}",
    summarize_instruction: "Please use the summarize_url tool to summarize this web page: {{url}}",
    summary_prompt: r#"Summarize the following web page.

Title: {{title}}
URL: {{url}}

Content:
{{content}}

Please provide:
1. A short summary (2-3 sentences)
2. Key points (3-5 items)
3. Key facts or figures (if any)"#,
    system_prompt: r#"You are a friendly and helpful chat assistant.

Current time: {{now}}

Your main capabilities:
1. Answer questions and hold a conversation
2. Summarize web pages when the user shares a link
3. Search the web when up-to-date information is needed
4. Analyze files (images, PDF) shared by URL
5. Answer follow-up questions about earlier pages and files

Reply rules:
- Keep replies concise but complete
- When summarizing pages or documents, give a short summary, key points and key facts

Available tools:
- web_search: search the web for current information
- summarize_url: fetch and summarize a web page (regular pages)
- analyze_file_url: download and analyze a file URL (.pdf, .jpg, .png, ...)"#,
    search_no_results: "No direct results found for \"{{query}}\". Try a regular search engine for more information.",
    search_failed: "The web search failed. Please try again later.",
    search_abstract: "Abstract",
    search_source: "Source",
    search_related: "Related topics",
    file_unsupported: "Unsupported file type: {{ext}}. Supported: PDF, JPG, PNG, GIF, WEBP, DOCX, PPTX",
    file_too_large: "The file is too large ({{size}}MB); the limit is 20MB",
    file_http_status: "Could not download the file: HTTP {{status}}",
    file_download_failed: "Could not download the file.",
    file_image_instruction: "The user shared an image ({{url}}). Please analyze and describe it:",
    file_pdf_instruction: "The user shared a PDF file ({{url}}). Please analyze it and provide a summary:",
    file_office_unsupported: "The Office document at {{url}} cannot be read directly; ask the user to share it as a PDF.",
};

static ZH_TW: Messages = Messages {
    unknown_title: "未知標題",
    notice_incomplete: "🔄 網頁內容不完整，正在使用瀏覽器模式載入，請稍候...",
    notice_special: "🔄 網頁需要特殊處理，正在使用瀏覽器模式載入，請稍候...",
    refuse_not_enough: "無法從此網頁提取足夠的內容進行摘要。網頁可能需要 JavaScript 渲染。",
    refuse_with_reason: "無法摘要此網頁。原因：{{reason}}",
    refuse_fetch_failed: "無法載入此網頁，網站可能無法連線或拒絕自動存取。",
    refuse_render_failed: "無法摘要此網頁：瀏覽器模式載入失敗，且沒有可用的靜態內容。",
    refuse_summary_failed: "目前無法摘要此網頁，請稍後再試。",
    agent_no_reply: "抱歉，我無法生成回覆。",
    agent_round_limit: "抱歉，工具呼叫次數過多仍未得到答案，請換個方式描述您的需求。",
    agent_model_failed: "抱歉，目前無法連線到語言模型，請稍後再試。",
    unknown_tool: "未知工具: {{name}}",
    summarize_instruction: "請使用 summarize_url 工具摘要以下網頁: {{url}}",
    summary_prompt: r#"請用繁體中文總結以下網頁內容。

標題: {{title}}
網址: {{url}}

內容:
{{content}}

請提供:
1. 簡短摘要 (2-3句)
2. 主要重點 (3-5點)
3. 關鍵資訊或數據 (如有)"#,
    system_prompt: r#"你是一個友善且有幫助的聊天機器人助手。

現在時間：{{now}}

你的主要功能：
1. 回答用戶的問題和進行對話
2. 當用戶分享網址時，自動摘要網頁內容（使用繁體中文）
3. 當需要最新資訊時，進行網頁搜尋
4. 分析用戶以網址分享的檔案（圖片、PDF）
5. 回答關於已摘要網頁與檔案的追問

回覆規則：
- 始終使用繁體中文回覆
- 保持回覆簡潔但完整
- 當摘要網頁或文件時，提供：簡短摘要、主要重點、關鍵資訊

可用工具：
- web_search: 搜尋網頁獲取最新資訊
- summarize_url: 獲取並摘要網頁內容（用於一般網頁）
- analyze_file_url: 下載並分析檔案 URL（用於 .pdf, .jpg, .png 等檔案連結）"#,
    search_no_results: "未找到「{{query}}」的直接搜尋結果。建議直接在搜尋引擎中查詢以獲取更多資訊。",
    search_failed: "搜尋時發生錯誤，請稍後再試。",
    search_abstract: "摘要",
    search_source: "來源",
    search_related: "相關主題",
    file_unsupported: "不支援的檔案格式：{{ext}}。支援的格式：PDF、JPG、PNG、GIF、WEBP、DOCX、PPTX",
    file_too_large: "檔案太大（{{size}}MB），上限為 20MB",
    file_http_status: "無法下載檔案：HTTP {{status}}",
    file_download_failed: "無法下載檔案。",
    file_image_instruction: "用戶分享了一張圖片（{{url}}），請分析圖片內容並用繁體中文描述：",
    file_pdf_instruction: "用戶分享了一個 PDF 檔案（{{url}}），請分析內容並用繁體中文提供摘要：",
    file_office_unsupported: "無法直接讀取 {{url}} 的 Office 文件，請用戶改以 PDF 分享。",
};

impl Locale {
    pub fn messages(self) -> &'static Messages {
        match self {
            Locale::En => &EN,
            Locale::ZhTw => &ZH_TW,
        }
    }
}

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{(\w+)\}\}").expect("Invalid placeholder regex"));

/// Fill `{{key}}` placeholders in a template. Substituted values are never
/// scanned again; unknown keys are left as they are.
pub fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures| {
            vars.iter()
                .find(|(key, _)| *key == &caps[1])
                .map_or_else(|| caps[0].to_string(), |(_, value)| value.to_string())
        })
        .into_owned()
}
