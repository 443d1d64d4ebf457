//! Quiz flow and canvas UI.
//!
//! One [`App`] controller owns everything mutable: the loaded question pool,
//! the running [`Session`], the effect [`Stage`] and the advance timer. The
//! thread-local slot only exists so the requestAnimationFrame closure and the
//! DOM event listeners can reach the controller; nothing else touches it.
//!
//! Screen flow is `Start -> Asking -> Result`. While asking, a selection
//! freezes the question and shows feedback for a fixed hold time before the
//! next question (or the result screen) comes up.

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlCanvasElement, RequestCache, RequestInit, Response,
    console, window,
};

use crate::csv::{self, QuestionRecord};
use crate::fx::{self, Stage};
use crate::rng::Rng;

/// Questions drawn from the pool per session.
pub const QUIZ_DRAW: usize = 5;
/// How long feedback stays on screen before the session advances.
pub const FEEDBACK_HOLD_MS: f64 = 1200.0;
/// Fixed total; per-question value is derived from the session length.
pub const TOTAL_POINTS: u32 = 100;

const BANK_URL: &str = "questions.csv";
const CANVAS_ID: &str = "quiz-canvas";
const START_BTN_ID: &str = "quiz-start-btn";
const RESTART_BTN_ID: &str = "quiz-restart-btn";
const ERROR_OVERLAY_ID: &str = "quiz-load-error";

const BUTTON_STYLE: &str = "font-size:18px; padding:10px 14px; border-radius:8px; \
     background:#ffffff; color:#444444; box-shadow:0 4px 10px rgba(0,0,0,0.08); cursor:pointer;";

// --- Session state ----------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Start,
    Asking,
    Result,
}

/// One run through a drawn subset of the pool.
pub struct Session {
    pub quiz: Vec<QuestionRecord>,
    pub current: usize,
    pub score: usize,
    pub selected: Option<usize>,
    pub show_feedback: bool,
    pub feedback_text: String,
    pub phase: Phase,
    pub numeric_score: u32,
    pub result_pct: f64,
}

impl Session {
    pub fn new() -> Self {
        Session {
            quiz: Vec::new(),
            current: 0,
            score: 0,
            selected: None,
            show_feedback: false,
            feedback_text: String::new(),
            phase: Phase::Start,
            numeric_score: 0,
            result_pct: 0.0,
        }
    }

    /// Draw up to [`QUIZ_DRAW`] questions and reset every counter. Shuffled
    /// twice so truncation picks a random subset and the subset comes out in
    /// random order.
    pub fn begin(&mut self, pool: &[QuestionRecord], rng: &mut Rng) {
        let mut draw: Vec<QuestionRecord> = pool.to_vec();
        rng.shuffle(&mut draw);
        draw.truncate(QUIZ_DRAW);
        rng.shuffle(&mut draw);
        self.quiz = draw;
        self.current = 0;
        self.score = 0;
        self.selected = None;
        self.show_feedback = false;
        self.feedback_text.clear();
        self.numeric_score = 0;
        self.result_pct = 0.0;
        self.phase = Phase::Asking;
    }

    pub fn current_question(&self) -> Option<&QuestionRecord> {
        self.quiz.get(self.current)
    }

    /// Register a selection. Returns whether it was correct, or `None` when
    /// the click must be ignored (feedback already showing, or no question).
    pub fn choose(&mut self, index: usize) -> Option<bool> {
        if self.phase != Phase::Asking || self.show_feedback {
            return None;
        }
        let q = self.quiz.get(self.current)?;
        let correct = index == q.answer.index();
        if correct {
            self.score += 1;
            self.feedback_text = if q.feedback.is_empty() {
                "答對！".to_string()
            } else {
                format!("答對！　{}", q.feedback)
            };
        } else {
            self.feedback_text =
                format!("答錯。正確答案：{}.　{}", q.answer.as_char(), q.feedback);
        }
        self.selected = Some(index);
        self.show_feedback = true;
        Some(correct)
    }

    /// Move past the feedback: next question, or the result screen when the
    /// quiz is exhausted.
    pub fn advance(&mut self) {
        self.current += 1;
        self.selected = None;
        self.show_feedback = false;
        self.feedback_text.clear();
        if self.current >= self.quiz.len() {
            self.finish();
        }
    }

    fn finish(&mut self) {
        self.phase = Phase::Result;
        self.numeric_score = numeric_score(self.score, self.quiz.len());
        self.result_pct = self.numeric_score as f64 / TOTAL_POINTS as f64 * 100.0;
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

/// Score out of [`TOTAL_POINTS`], rounded to the nearest point.
pub fn numeric_score(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (correct as f64 * (TOTAL_POINTS as f64 / total as f64)).round() as u32
}

/// Which celebration layers the result screen gets, on top of the confetti
/// spray every result receives. A zero score means zero percent, so the two
/// flags can never be set together.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResultEffects {
    pub fireworks: bool,
    pub red_burst: bool,
}

pub fn result_effects(numeric_score: u32, result_pct: f64) -> ResultEffects {
    ResultEffects {
        fireworks: result_pct >= 90.0,
        red_burst: numeric_score == 0,
    }
}

pub fn score_message(numeric_score: u32, result_pct: f64) -> &'static str {
    if numeric_score == TOTAL_POINTS {
        "完美！做得很好！"
    } else if result_pct >= 70.0 {
        "表現不錯，稍加複習可以更好。"
    } else {
        "建議再檢視題庫內容並多練習。"
    }
}

// --- Timing -----------------------------------------------------------------

/// One-shot deadline polled from the frame loop, driving the
/// feedback-then-advance transition.
pub struct AdvanceTimer {
    due_ms: Option<f64>,
}

impl AdvanceTimer {
    pub fn new() -> Self {
        AdvanceTimer { due_ms: None }
    }

    pub fn schedule(&mut self, now_ms: f64, delay_ms: f64) {
        self.due_ms = Some(now_ms + delay_ms);
    }

    pub fn cancel(&mut self) {
        self.due_ms = None;
    }

    /// True exactly once when the deadline has passed.
    pub fn fire(&mut self, now_ms: f64) -> bool {
        match self.due_ms {
            Some(due) if now_ms >= due => {
                self.due_ms = None;
                true
            }
            _ => false,
        }
    }
}

impl Default for AdvanceTimer {
    fn default() -> Self {
        AdvanceTimer::new()
    }
}

// --- Layout -----------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    /// Strict on all edges; a click exactly on the border misses.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px > self.x && px < self.x + self.w && py > self.y && py < self.y + self.h
    }
}

/// Option rows for the current viewport, top to bottom.
pub fn option_rects(view_w: f64, view_h: f64, count: usize) -> Vec<Rect> {
    let start_y = view_h * 0.25;
    let gap = (view_h * 0.03).min(24.0);
    let h = (view_h * 0.11).min(80.0);
    let w = view_w * 0.92;
    let x = view_w * 0.04;
    (0..count)
        .map(|i| Rect {
            x,
            y: start_y + i as f64 * (h + gap),
            w,
            h,
        })
        .collect()
}

/// Baseline of the feedback line, just below the last option row.
pub fn feedback_line_y(view_h: f64, count: usize) -> f64 {
    let gap = (view_h * 0.03).min(24.0);
    let h = (view_h * 0.11).min(80.0);
    view_h * 0.25 + count as f64 * (h + gap) + 20.0
}

/// Footprint of the result card, horizontally centered.
pub fn result_card(view_w: f64, view_h: f64) -> Rect {
    let w = (view_w * 0.8).min(900.0);
    let h = (view_h * 0.7).min(500.0);
    Rect {
        x: view_w / 2.0 - w / 2.0,
        y: view_h * 0.12,
        w,
        h,
    }
}

// --- Controller -------------------------------------------------------------

struct App {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    pool: Vec<QuestionRecord>,
    loaded: bool,
    session: Session,
    stage: Stage,
    rng: Rng,
    mouse_x: f64,
    mouse_y: f64,
    timer: AdvanceTimer,
}

thread_local! {
    static APP: std::cell::RefCell<Option<App>> = std::cell::RefCell::new(None);
}

type FrameCallback = std::rc::Rc<std::cell::RefCell<Option<Closure<dyn FnMut(f64)>>>>;

impl App {
    fn view_w(&self) -> f64 {
        self.canvas.width() as f64
    }

    fn view_h(&self) -> f64 {
        self.canvas.height() as f64
    }

    fn begin_session(&mut self) {
        self.timer.cancel();
        self.stage.clear();
        self.session.begin(&self.pool, &mut self.rng);
    }

    fn handle_press(&mut self, x: f64, y: f64) {
        if self.session.phase != Phase::Asking || self.session.current_question().is_none() {
            return;
        }
        let rects = option_rects(self.view_w(), self.view_h(), 4);
        for (i, rect) in rects.iter().enumerate() {
            if rect.contains(x, y) {
                self.answer(i, x, y);
                break;
            }
        }
    }

    fn answer(&mut self, index: usize, x: f64, y: f64) {
        let Some(correct) = self.session.choose(index) else {
            return;
        };
        if correct {
            self.stage
                .spawn_answer_burst(x, y, fx::ANSWER_BURST_COUNT);
        }
        self.timer.schedule(now_ms(), FEEDBACK_HOLD_MS);
    }

    /// One animation frame: pending transition first, then draw everything,
    /// then advance the particles so they overlay the fresh frame.
    fn frame(&mut self, now: f64) {
        if self.timer.fire(now) {
            self.session.advance();
            if self.session.phase == Phase::Result {
                self.enter_result();
            }
        }

        let w = self.view_w();
        let h = self.view_h();
        draw_background(&self.ctx, w, h);
        draw_decor(&self.ctx, w, h);
        match self.session.phase {
            Phase::Start => draw_start_screen(&self.ctx, w, h),
            Phase::Asking => {
                draw_question(&self.ctx, &self.session, w, h, self.mouse_x, self.mouse_y);
                if self.session.show_feedback {
                    draw_feedback_ring(&self.ctx, &self.session, w, h);
                }
            }
            Phase::Result => draw_result(&self.ctx, &self.session, w, h),
        }
        self.stage.step(w, h);
        self.stage.render(&self.ctx);
    }

    fn enter_result(&mut self) {
        let w = self.view_w();
        let h = self.view_h();
        let card = result_card(w, h);
        let cx = w / 2.0;
        let cy = card.y + card.h * 0.5;

        self.stage
            .spawn_celebration(cx, cy - 40.0, fx::CELEBRATION_COUNT);
        let effects = result_effects(self.session.numeric_score, self.session.result_pct);
        if effects.fireworks {
            self.stage
                .launch_fireworks(w * 0.5, h * 0.6, fx::FIREWORK_ROCKET_COUNT, w);
        }
        if effects.red_burst {
            self.stage
                .spawn_red_burst(cx, cy + 60.0, fx::RED_BURST_COUNT);
        }

        if let Some(doc) = window().and_then(|win| win.document()) {
            ensure_restart_button(&doc).ok();
        }
        console::log_1(
            &format!(
                "結果數字分數: {} 百分比: {}",
                self.session.numeric_score, self.session.result_pct
            )
            .into(),
        );
    }
}

/// Mount the quiz: canvas, DOM chrome, listeners, bank fetch, frame loop.
pub fn start() -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let view_w = win.inner_width()?.as_f64().unwrap_or(800.0);
    let view_h = win.inner_height()?.as_f64().unwrap_or(600.0);

    // Create / reuse the full-window canvas.
    let canvas: HtmlCanvasElement = if let Some(el) = doc.get_element_by_id(CANVAS_ID) {
        el.dyn_into()?
    } else {
        let c: HtmlCanvasElement = doc.create_element("canvas")?.dyn_into()?;
        c.set_id(CANVAS_ID);
        c.set_attribute("style", "position:fixed; left:0; top:0; display:block; z-index:0;")
            .ok();
        doc.body()
            .ok_or_else(|| JsValue::from_str("no body"))?
            .append_child(&c)?;
        c
    };
    canvas.set_width(view_w as u32);
    canvas.set_height(view_h as u32);
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("no 2d context"))?
        .dyn_into()?;

    let app = App {
        canvas: canvas.clone(),
        ctx,
        pool: Vec::new(),
        loaded: false,
        session: Session::new(),
        stage: Stage::new(),
        rng: Rng::seeded(),
        mouse_x: 0.0,
        mouse_y: 0.0,
        timer: AdvanceTimer::new(),
    };
    APP.with(|cell| cell.replace(Some(app)));

    load_question_bank();
    create_start_button(&doc)?;

    // Selection clicks.
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::MouseEvent| {
            let x = evt.offset_x() as f64;
            let y = evt.offset_y() as f64;
            APP.with(|cell| {
                if let Some(app) = cell.borrow_mut().as_mut() {
                    app.handle_press(x, y);
                }
            });
        }) as Box<dyn FnMut(_)>);
        canvas.add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Hover tracking for option highlighting.
    {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::MouseEvent| {
            APP.with(|cell| {
                if let Some(app) = cell.borrow_mut().as_mut() {
                    app.mouse_x = evt.offset_x() as f64;
                    app.mouse_y = evt.offset_y() as f64;
                }
            });
        }) as Box<dyn FnMut(_)>);
        canvas.add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    // Keep the canvas matching the window; layout is recomputed per frame.
    {
        let canvas_resize = canvas.clone();
        let closure = Closure::wrap(Box::new(move |_evt: web_sys::Event| {
            if let Some(win) = window() {
                let w = win.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(800.0);
                let h = win.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0);
                canvas_resize.set_width(w as u32);
                canvas_resize.set_height(h as u32);
            }
        }) as Box<dyn FnMut(_)>);
        win.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    start_frame_loop();
    Ok(())
}

fn start_frame_loop() {
    let f: FrameCallback = std::rc::Rc::new(std::cell::RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        APP.with(|cell| {
            if let Some(app) = cell.borrow_mut().as_mut() {
                app.frame(ts);
            }
        });
        if let Some(w) = window() {
            let _ =
                w.request_animation_frame(f.borrow().as_ref().unwrap().as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut(f64)>));
    if let Some(w) = window() {
        let _ = w.request_animation_frame(g.borrow().as_ref().unwrap().as_ref().unchecked_ref());
    }
}

fn now_ms() -> f64 {
    window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

// --- Question bank loading --------------------------------------------------

/// Fetch the bank and fill the pool. Never blocks the frame loop; until the
/// pool is ready the start button complains instead of starting.
fn load_question_bank() {
    APP.with(|cell| {
        if let Some(app) = cell.borrow_mut().as_mut() {
            app.loaded = false;
        }
    });
    spawn_local(async {
        match fetch_bank_text().await {
            Ok(text) => {
                let records = csv::parse(&text);
                let count = records.len();
                APP.with(|cell| {
                    if let Some(app) = cell.borrow_mut().as_mut() {
                        app.pool = records;
                        app.loaded = true;
                    }
                });
                console::log_1(&format!("questions.csv 解析完成，題數: {count}").into());
            }
            Err(err) => {
                console::error_1(&format!("fetch questions.csv 失敗：{err}").into());
                show_load_error(&err);
            }
        }
    });
}

async fn fetch_bank_text() -> Result<String, String> {
    let win = window().ok_or("no window")?;
    let init = RequestInit::new();
    init.set_cache(RequestCache::NoStore);
    let resp_value = JsFuture::from(win.fetch_with_str_and_init(BANK_URL, &init))
        .await
        .map_err(|e| format!("{e:?}"))?;
    let resp: Response = resp_value
        .dyn_into()
        .map_err(|_| "unexpected fetch result".to_string())?;
    if !resp.ok() {
        return Err(format!("HTTP {} {}", resp.status(), resp.status_text()));
    }
    let text = JsFuture::from(resp.text().map_err(|e| format!("{e:?}"))?)
        .await
        .map_err(|e| format!("{e:?}"))?;
    Ok(text.as_string().unwrap_or_default())
}

// --- DOM chrome -------------------------------------------------------------

fn create_start_button(doc: &Document) -> Result<(), JsValue> {
    if doc.get_element_by_id(START_BTN_ID).is_some() {
        return Ok(());
    }
    let btn = doc.create_element("button")?;
    btn.set_id(START_BTN_ID);
    btn.set_text_content(Some("開始測驗"));
    btn.set_attribute(
        "style",
        &format!(
            "{BUTTON_STYLE} position:fixed; left:50%; top:calc(50% + 40px); \
             transform:translateX(-50%); z-index:10;"
        ),
    )
    .ok();
    let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
        let ready = APP.with(|cell| {
            cell.borrow()
                .as_ref()
                .map(|app| app.loaded && !app.pool.is_empty())
                .unwrap_or(false)
        });
        if !ready {
            if let Some(win) = window() {
                win.alert_with_message(
                    "questions.csv 尚未載入或為空。請確認檔案位置並以 HTTP 伺服器開啟\
                     （如 python -m http.server 或 Live Server）。",
                )
                .ok();
            }
            return;
        }
        if let Some(doc) = window().and_then(|w| w.document()) {
            if let Some(el) = doc.get_element_by_id(START_BTN_ID) {
                el.set_attribute("style", "display:none;").ok();
            }
        }
        APP.with(|cell| {
            if let Some(app) = cell.borrow_mut().as_mut() {
                app.begin_session();
            }
        });
    }) as Box<dyn FnMut(_)>);
    btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    doc.body()
        .ok_or_else(|| JsValue::from_str("no body"))?
        .append_child(&btn)?;
    Ok(())
}

fn ensure_restart_button(doc: &Document) -> Result<(), JsValue> {
    if doc.get_element_by_id(RESTART_BTN_ID).is_some() {
        return Ok(());
    }
    let btn = doc.create_element("button")?;
    btn.set_id(RESTART_BTN_ID);
    btn.set_text_content(Some("重新測驗"));
    btn.set_attribute(
        "style",
        &format!(
            "{BUTTON_STYLE} position:fixed; left:50%; bottom:56px; transform:translateX(-50%); \
             width:120px; height:44px; z-index:10;"
        ),
    )
    .ok();
    let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
        if let Some(doc) = window().and_then(|w| w.document()) {
            if let Some(el) = doc.get_element_by_id(RESTART_BTN_ID) {
                el.remove();
            }
        }
        APP.with(|cell| {
            if let Some(app) = cell.borrow_mut().as_mut() {
                app.begin_session();
            }
        });
    }) as Box<dyn FnMut(_)>);
    btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
    closure.forget();
    doc.body()
        .ok_or_else(|| JsValue::from_str("no body"))?
        .append_child(&btn)?;
    Ok(())
}

/// Load-failure notice with a retry control. Created once; retry removes it
/// and re-issues the fetch.
fn show_load_error(err: &str) {
    let Some(doc) = window().and_then(|w| w.document()) else {
        return;
    };
    if doc.get_element_by_id(ERROR_OVERLAY_ID).is_some() {
        return;
    }
    let Ok(div) = doc.create_element("div") else {
        return;
    };
    div.set_id(ERROR_OVERLAY_ID);
    div.set_attribute(
        "style",
        "position:fixed; left:10px; top:10px; right:10px; padding:12px; \
         background:rgba(255,240,240,0.95); color:#900; border:1px solid #f66; z-index:9999; \
         font-family:Arial, sans-serif; white-space:pre-line;",
    )
    .ok();
    div.set_text_content(Some(&format!(
        "載入 questions.csv 失敗：{err}\n\
         請確認 questions.csv 位於專案資料夾並以 HTTP 伺服器啟動（不要用 file://）。"
    )));
    let Ok(btn) = doc.create_element("button") else {
        return;
    };
    btn.set_text_content(Some("重新嘗試"));
    btn.set_attribute("style", "margin-left:12px;").ok();
    let closure = Closure::wrap(Box::new(move |_evt: web_sys::MouseEvent| {
        if let Some(doc) = window().and_then(|w| w.document()) {
            if let Some(el) = doc.get_element_by_id(ERROR_OVERLAY_ID) {
                el.remove();
            }
        }
        load_question_bank();
    }) as Box<dyn FnMut(_)>);
    btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())
        .ok();
    closure.forget();
    div.append_child(&btn).ok();
    if let Some(body) = doc.body() {
        body.append_child(&div).ok();
    }
}

// --- Canvas rendering -------------------------------------------------------

/// Soft vertical gradient, cream into mint-grey into lavender.
fn draw_background(ctx: &CanvasRenderingContext2d, w: f64, h: f64) {
    let gradient = ctx.create_linear_gradient(0.0, 0.0, 0.0, h);
    gradient.add_color_stop(0.0, "rgb(255,242,230)").ok();
    gradient.add_color_stop(0.5, "rgb(245,243,241)").ok();
    gradient.add_color_stop(1.0, "rgb(241,241,249)").ok();
    ctx.set_fill_style_canvas_gradient(&gradient);
    ctx.fill_rect(0.0, 0.0, w, h);
}

/// Two faint pastel discs, upper-left and lower-right.
fn draw_decor(ctx: &CanvasRenderingContext2d, w: f64, h: f64) {
    let d = w.min(h);
    ctx.set_fill_style_str("rgba(255,235,245,0.31)");
    ctx.begin_path();
    ctx.arc(w * 0.12, h * 0.1, d * 0.125, 0.0, std::f64::consts::TAU)
        .ok();
    ctx.fill();
    ctx.set_fill_style_str("rgba(235,255,240,0.27)");
    ctx.begin_path();
    ctx.arc(w * 0.85, h * 0.85, d * 0.175, 0.0, std::f64::consts::TAU)
        .ok();
    ctx.fill();
}

fn draw_start_screen(ctx: &CanvasRenderingContext2d, w: f64, h: f64) {
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.set_fill_style_str("rgb(60,60,60)");
    ctx.set_font(&font_px((w * 0.05).min(48.0)));
    ctx.fill_text("多選題測驗系統", w / 2.0, h / 2.0 - 80.0).ok();
    ctx.set_fill_style_str("rgb(90,90,90)");
    ctx.set_font(&font_px((w * 0.02).min(18.0)));
    ctx.fill_text(
        "由 CSV 題庫隨機抽出最多 5 題，並於每次測驗出 5 題",
        w / 2.0,
        h / 2.0 - 40.0,
    )
    .ok();
}

fn draw_question(
    ctx: &CanvasRenderingContext2d,
    session: &Session,
    w: f64,
    h: f64,
    mouse_x: f64,
    mouse_y: f64,
) {
    let Some(q) = session.current_question() else {
        return;
    };
    ctx.set_text_align("left");
    ctx.set_text_baseline("top");
    ctx.set_fill_style_str("rgb(70,70,70)");
    ctx.set_font(&font_px((w * 0.028).min(22.0)));
    ctx.fill_text(
        &format!("題目 {} / {}", session.current + 1, session.quiz.len()),
        w * 0.04,
        h * 0.03,
    )
    .ok();

    let prompt_size = (w * 0.04).min(28.0);
    ctx.set_fill_style_str("rgb(60,60,60)");
    ctx.set_font(&font_px(prompt_size));
    fill_text_wrapped(ctx, &q.prompt, w * 0.04, h * 0.08, w * 0.92, prompt_size * 1.25);

    let rects = option_rects(w, h, q.options.len());
    for (i, rect) in rects.iter().enumerate() {
        let bg = if session.selected == Some(i) {
            "rgb(200,255,230)"
        } else if rect.contains(mouse_x, mouse_y) {
            "rgb(255,245,220)"
        } else {
            match i % 4 {
                0 => "rgb(246,240,255)",
                1 => "rgb(235,250,240)",
                2 => "rgb(255,245,220)",
                _ => "rgb(255,250,235)",
            }
        };
        ctx.set_fill_style_str(bg);
        ctx.set_stroke_style_str("rgb(200,200,200)");
        ctx.set_line_width(1.0);
        rounded_rect_path(ctx, rect.x, rect.y, rect.w, rect.h, 12.0);
        ctx.fill();
        ctx.stroke();

        ctx.set_fill_style_str("rgb(60,60,60)");
        ctx.set_font(&font_px((w * 0.02).min(18.0)));
        ctx.set_text_baseline("middle");
        let label = (b'A' + i as u8) as char;
        ctx.fill_text(
            &format!("{label}. {}", q.options[i]),
            rect.x + 16.0,
            rect.y + rect.h / 2.0,
        )
        .ok();
        ctx.set_text_baseline("top");
    }

    if session.show_feedback {
        ctx.set_fill_style_str("rgb(80,80,80)");
        ctx.set_font(&font_px((w * 0.018).min(18.0)));
        ctx.fill_text(
            &session.feedback_text,
            w * 0.04,
            feedback_line_y(h, rects.len()),
        )
        .ok();
    }
}

/// Coral ring around the correct option while feedback is showing.
fn draw_feedback_ring(ctx: &CanvasRenderingContext2d, session: &Session, w: f64, h: f64) {
    let Some(q) = session.current_question() else {
        return;
    };
    let rects = option_rects(w, h, q.options.len());
    let Some(rect) = rects.get(q.answer.index()) else {
        return;
    };
    ctx.set_stroke_style_str("rgb(255,165,140)");
    ctx.set_line_width(4.0);
    rounded_rect_path(ctx, rect.x, rect.y, rect.w, rect.h, 12.0);
    ctx.stroke();
}

fn draw_result(ctx: &CanvasRenderingContext2d, session: &Session, w: f64, h: f64) {
    let card = result_card(w, h);
    ctx.set_fill_style_str("rgba(255,255,255,0.98)");
    rounded_rect_path(ctx, card.x, card.y, card.w, card.h, 20.0);
    ctx.fill();

    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.set_fill_style_str("rgb(60,60,60)");
    ctx.set_font(&font_px((w * 0.03).min(36.0)));
    ctx.fill_text("測驗結果", w / 2.0, card.y + 50.0).ok();
    ctx.set_font(&font_px((w * 0.02).min(24.0)));
    ctx.fill_text(
        &format!(
            "得分：{} / {TOTAL_POINTS}　({:.1}%)",
            session.numeric_score, session.result_pct
        ),
        w / 2.0,
        card.y + 110.0,
    )
    .ok();
    ctx.set_font(&font_px((w * 0.018).min(18.0)));
    ctx.fill_text(
        score_message(session.numeric_score, session.result_pct),
        w / 2.0,
        card.y + 150.0,
    )
    .ok();

    // Short review list: prompt plus the correct letter.
    ctx.set_text_align("left");
    ctx.set_text_baseline("top");
    let review_size = (w * 0.015).min(16.0);
    ctx.set_fill_style_str("rgb(80,80,80)");
    ctx.set_font(&font_px(review_size));
    let mut y = card.y + 200.0;
    for (i, q) in session.quiz.iter().enumerate() {
        let line = format!("{}. {}  正確：{}", i + 1, q.prompt, q.answer.as_char());
        fill_text_wrapped(ctx, &line, card.x + 30.0, y, card.w - 60.0, review_size * 1.25);
        y += 60.0;
    }
}

fn font_px(size: f64) -> String {
    format!("{size:.0}px Arial")
}

fn rounded_rect_path(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
    let r = r.min(w / 2.0).min(h / 2.0);
    ctx.begin_path();
    ctx.move_to(x + r, y);
    ctx.arc_to(x + w, y, x + w, y + h, r).ok();
    ctx.arc_to(x + w, y + h, x, y + h, r).ok();
    ctx.arc_to(x, y + h, x, y, r).ok();
    ctx.arc_to(x, y, x + w, y, r).ok();
    ctx.close_path();
}

/// Greedy per-character wrap; the display strings are CJK and have no spaces
/// to break on.
fn fill_text_wrapped(
    ctx: &CanvasRenderingContext2d,
    text: &str,
    x: f64,
    y: f64,
    max_w: f64,
    line_h: f64,
) {
    let mut line = String::new();
    let mut ty = y;
    for ch in text.chars() {
        if ch == '\n' {
            ctx.fill_text(&line, x, ty).ok();
            line.clear();
            ty += line_h;
            continue;
        }
        line.push(ch);
        let width = ctx.measure_text(&line).map(|m| m.width()).unwrap_or(0.0);
        if width > max_w && line.chars().count() > 1 {
            if let Some(last) = line.pop() {
                ctx.fill_text(&line, x, ty).ok();
                line.clear();
                line.push(last);
                ty += line_h;
            }
        }
    }
    if !line.is_empty() {
        ctx.fill_text(&line, x, ty).ok();
    }
}
