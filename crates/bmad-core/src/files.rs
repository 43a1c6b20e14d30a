use indexmap::IndexMap;

pub const ENTRY_FILE: &str = "index.jsx";

const SEED_INDEX_JSX: &str = r#"import React from 'react'
import { Button } from './components/ui/button'

export default function App() {
  return (
    <div className="min-h-screen bg-black">
      <header className="p-6">
        <h1 className="text-4xl font-bold text-white">
          Welcome to BMAD
        </h1>
        <p className="text-zinc-400 mt-2">
          Build amazing applications with AI
        </p>
      </header>
      <main className="p-6">
        <Button variant="primary">
          Get Started
        </Button>
      </main>
    </div>
  )
}"#;

const SEED_STYLES_CSS: &str = r#"/* BMAD Workspace Styles */

:root {
  --primary: #22c55e;
  --secondary: #d4ff00;
}

.container {
  max-width: 1200px;
  margin: 0 auto;
  padding: 2rem;
}

.btn-primary {
  background: var(--primary);
  color: #000;
  padding: 0.75rem 1.5rem;
  border-radius: 0.5rem;
  font-weight: 600;
}"#;

const SEED_CONFIG_JSON: &str = r#"{
  "name": "my-bmad-app",
  "version": "1.0.0",
  "description": "Built with BMAD Workspace",
  "dependencies": {
    "react": "^18.2.0",
    "react-dom": "^18.2.0"
  },
  "bmad": {
    "tier": "pro",
    "aiOrchestration": true,
    "specKit": true
  }
}"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileLanguage {
    JavaScript,
    Json,
    Css,
    Html,
    PlainText,
}

impl FileLanguage {
    pub fn for_file(name: &str) -> Self {
        if name.ends_with(".jsx") || name.ends_with(".js") {
            Self::JavaScript
        } else if name.ends_with(".json") {
            Self::Json
        } else if name.ends_with(".css") {
            Self::Css
        } else if name.ends_with(".html") {
            Self::Html
        } else {
            Self::PlainText
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::JavaScript => "javascript",
            Self::Json => "json",
            Self::Css => "css",
            Self::Html => "html",
            Self::PlainText => "plaintext",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::JavaScript => "js",
            Self::Json => "json",
            Self::Css => "css",
            Self::Html => "html",
            Self::PlainText => "txt",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceFile {
    pub name: String,
    pub content: String,
}

impl WorkspaceFile {
    pub fn line_count(&self) -> usize {
        self.content.lines().count()
    }
}

/// Filename → content, iterated in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceFiles {
    entries: IndexMap<String, String>,
}

impl WorkspaceFiles {
    pub fn seeded() -> Self {
        let mut entries = IndexMap::new();
        entries.insert(ENTRY_FILE.to_string(), SEED_INDEX_JSX.to_string());
        entries.insert("styles.css".to_string(), SEED_STYLES_CSS.to_string());
        entries.insert("config.json".to_string(), SEED_CONFIG_JSON.to_string());
        Self { entries }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replaces the content of an existing file in place. Unknown names are
    /// rejected so display order never changes.
    pub fn update(&mut self, name: &str, content: String) -> bool {
        match self.entries.get_mut(name) {
            Some(slot) => {
                *slot = content;
                true
            }
            None => false,
        }
    }

    pub fn append(&mut self, name: &str, extra: &str) -> bool {
        match self.entries.get_mut(name) {
            Some(slot) => {
                slot.push_str(extra);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = WorkspaceFile> + '_ {
        self.entries.iter().map(|(name, content)| WorkspaceFile {
            name: name.clone(),
            content: content.clone(),
        })
    }
}
