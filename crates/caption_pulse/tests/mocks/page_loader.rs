use std::sync::{Arc, Mutex};

use caption_pulse::web::PageLoader;
use url::Url;

#[derive(Clone)]
pub struct MockPageLoader {
    pub text: String,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_with: Option<String>,
}

impl MockPageLoader {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            text: String::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: Some(msg.to_string()),
        }
    }
}

impl Default for MockPageLoader {
    fn default() -> Self {
        Self::new("")
    }
}

impl PageLoader for MockPageLoader {
    const USER_AGENT: &'static str = "mock-agent";

    async fn load_text(&self, url: &Url) -> anyhow::Result<String> {
        self.calls.lock().unwrap().push(url.to_string());
        if let Some(ref msg) = self.fail_with {
            anyhow::bail!("{}", msg);
        }
        Ok(self.text.clone())
    }
}
