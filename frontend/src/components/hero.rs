//! Hero section component

use leptos::*;

#[component]
pub fn Hero() -> impl IntoView {
    view! {
        <div class="hero">
            <h1>"تحسين جودة الفيديو"</h1>
            <p class="subtitle">
                "ارفع مقطع فيديو وسنعيده إليك بدقة أعلى. "
                "يتم دعم جميع صيغ الفيديو الشائعة."
            </p>
        </div>
    }
}
