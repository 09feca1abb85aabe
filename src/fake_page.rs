// In-memory page used by unit tests of the wait, resolver, interaction and page layers

use anyhow::{Result, bail};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::browser::{KEY_ENTER, PageDriver};
use crate::locator::LocatorCandidate;

#[derive(Debug, Clone)]
pub struct FakeElement {
    /// CSS query this element answers to
    pub selector: String,
    pub text: String,
    pub attributes: Vec<(String, String)>,
    pub visible: bool,
    /// Becomes visible this long after the page was created
    pub appears_after: Option<Duration>,
    pub click_fails: bool,
}

impl FakeElement {
    pub fn new(selector: &str) -> Self {
        Self {
            selector: selector.to_string(),
            text: String::new(),
            attributes: Vec::new(),
            visible: true,
            appears_after: None,
            click_fails: false,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    pub fn appearing_after(mut self, delay: Duration) -> Self {
        self.appears_after = Some(delay);
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.push((name.to_string(), value.to_string()));
        self
    }

    pub fn failing_click(mut self) -> Self {
        self.click_fails = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Navigate(String),
    Reload,
    Click(usize),
    Clear(usize),
    Keys(usize, String),
    GlobalKey(String),
    Scroll(i64, i64),
}

#[derive(Default)]
struct State {
    url: String,
    elements: Vec<FakeElement>,
    located: Vec<LocatorCandidate>,
    events: Vec<(Instant, Event)>,
    screenshots: usize,
    /// URL the page switches to when an element is clicked
    redirect_on_click: Option<(usize, String)>,
    /// URL the page switches to when Enter is sent to any element
    redirect_on_enter: Option<String>,
    /// Clicking the first element hides the second
    hide_on_click: Option<(usize, usize)>,
}

pub struct FakePage {
    created: Instant,
    screenshot_fails: bool,
    state: Mutex<State>,
}

impl FakePage {
    pub fn new(url: &str, elements: Vec<FakeElement>) -> Self {
        Self {
            created: Instant::now(),
            screenshot_fails: false,
            state: Mutex::new(State {
                url: url.to_string(),
                elements,
                ..State::default()
            }),
        }
    }

    pub fn with_failing_screenshots(mut self) -> Self {
        self.screenshot_fails = true;
        self
    }

    /// Clicking element `index` moves the page to `url`
    pub fn redirect_on_click(self, index: usize, url: &str) -> Self {
        self.state.lock().unwrap().redirect_on_click = Some((index, url.to_string()));
        self
    }

    /// Clicking element `clicked` hides element `hidden`
    pub fn hide_on_click(self, clicked: usize, hidden: usize) -> Self {
        self.state.lock().unwrap().hide_on_click = Some((clicked, hidden));
        self
    }

    /// Pressing Enter in any field moves the page to `url`
    pub fn redirect_on_enter(self, url: &str) -> Self {
        self.state.lock().unwrap().redirect_on_enter = Some(url.to_string());
        self
    }

    pub fn located(&self) -> Vec<LocatorCandidate> {
        self.state.lock().unwrap().located.clone()
    }

    pub fn events(&self) -> Vec<Event> {
        self.state
            .lock()
            .unwrap()
            .events
            .iter()
            .map(|(_, e)| e.clone())
            .collect()
    }

    pub fn timed_events(&self) -> Vec<(Instant, Event)> {
        self.state.lock().unwrap().events.clone()
    }

    pub fn screenshots(&self) -> usize {
        self.state.lock().unwrap().screenshots
    }

    /// Text typed into element `index`, concatenated
    pub fn typed_into(&self, index: usize) -> String {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Keys(i, keys) if i == index => Some(keys),
                _ => None,
            })
            .collect()
    }

    fn record(&self, event: Event) {
        self.state.lock().unwrap().events.push((Instant::now(), event));
    }

    fn element(&self, index: usize) -> Result<FakeElement> {
        match self.state.lock().unwrap().elements.get(index) {
            Some(el) => Ok(el.clone()),
            None => bail!("stale element reference: {}", index),
        }
    }
}

#[async_trait]
impl PageDriver for FakePage {
    type Element = usize;

    async fn navigate(&self, url: &str) -> Result<()> {
        self.state.lock().unwrap().url = url.to_string();
        self.record(Event::Navigate(url.to_string()));
        Ok(())
    }

    async fn reload(&self) -> Result<()> {
        self.record(Event::Reload);
        Ok(())
    }

    async fn current_url(&self) -> Result<String> {
        Ok(self.state.lock().unwrap().url.clone())
    }

    async fn locate_all(&self, candidate: &LocatorCandidate) -> Result<Vec<usize>> {
        let mut state = self.state.lock().unwrap();
        state.located.push(candidate.clone());
        let query = candidate.css_query();

        let mut found = Vec::new();
        for (i, el) in state.elements.iter().enumerate() {
            if el.selector != query {
                continue;
            }
            let haystack = match candidate.match_attribute() {
                Some(attr) => el
                    .attributes
                    .iter()
                    .find(|(k, _)| k == attr)
                    .map(|(_, v)| v.clone())
                    .unwrap_or_default(),
                None => el.text.clone(),
            };
            if candidate.matches(&haystack)? {
                found.push(i);
            }
        }
        Ok(found)
    }

    async fn is_displayed(&self, element: &usize) -> Result<bool> {
        let el = self.element(*element)?;
        let appeared = match el.appears_after {
            Some(delay) => self.created.elapsed() >= delay,
            None => true,
        };
        Ok(el.visible && appeared)
    }

    async fn click(&self, element: &usize) -> Result<()> {
        let el = self.element(*element)?;
        if el.click_fails {
            bail!("element click intercepted");
        }
        self.record(Event::Click(*element));
        let mut state = self.state.lock().unwrap();
        if let Some((index, url)) = state.redirect_on_click.clone()
            && index == *element
        {
            state.url = url;
        }
        if let Some((clicked, hidden)) = state.hide_on_click
            && clicked == *element
            && let Some(el) = state.elements.get_mut(hidden)
        {
            el.visible = false;
        }
        Ok(())
    }

    async fn clear(&self, element: &usize) -> Result<()> {
        self.element(*element)?;
        self.record(Event::Clear(*element));
        Ok(())
    }

    async fn send_keys(&self, element: &usize, text: &str) -> Result<()> {
        self.element(*element)?;
        self.record(Event::Keys(*element, text.to_string()));
        if text == KEY_ENTER {
            let mut state = self.state.lock().unwrap();
            if let Some(url) = state.redirect_on_enter.clone() {
                state.url = url;
            }
        }
        Ok(())
    }

    async fn press_global(&self, key: &str) -> Result<()> {
        self.record(Event::GlobalKey(key.to_string()));
        Ok(())
    }

    async fn text(&self, element: &usize) -> Result<String> {
        Ok(self.element(*element)?.text)
    }

    async fn attribute(&self, element: &usize, name: &str) -> Result<Option<String>> {
        Ok(self
            .element(*element)?
            .attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone()))
    }

    async fn scroll_by(&self, dx: i64, dy: i64) -> Result<()> {
        self.record(Event::Scroll(dx, dy));
        Ok(())
    }

    async fn screenshot(&self) -> Result<Vec<u8>> {
        self.state.lock().unwrap().screenshots += 1;
        if self.screenshot_fails {
            bail!("no such window");
        }
        Ok(b"\x89PNG\r\n\x1a\nfake".to_vec())
    }
}
