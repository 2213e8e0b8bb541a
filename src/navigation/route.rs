pub trait Router {
    fn push(&mut self, path: &str);
    fn replace(&mut self, path: &str);
    fn current_path(&self) -> &str;
}

impl<R: Router + ?Sized> Router for &mut R {
    fn push(&mut self, path: &str) {
        (**self).push(path);
    }

    fn replace(&mut self, path: &str) {
        (**self).replace(path);
    }

    fn current_path(&self) -> &str {
        (**self).current_path()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRouter {
    history: Vec<String>,
}

impl Default for MemoryRouter {
    fn default() -> Self {
        Self::starting_at("/")
    }
}

impl MemoryRouter {
    pub fn starting_at(path: &str) -> Self {
        Self {
            history: vec![path.to_string()],
        }
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }
}

impl Router for MemoryRouter {
    fn push(&mut self, path: &str) {
        self.history.push(path.to_string());
    }

    fn replace(&mut self, path: &str) {
        match self.history.last_mut() {
            Some(current) => *current = path.to_string(),
            None => self.history.push(path.to_string()),
        }
    }

    fn current_path(&self) -> &str {
        self.history.last().map(String::as_str).unwrap_or("/")
    }
}
