use stride::model::{NewTask, Priority};

pub fn task(title: &str) -> NewTask {
    NewTask::new(title)
}

pub fn task_with_priority(title: &str, priority: Priority) -> NewTask {
    NewTask {
        priority,
        ..NewTask::new(title)
    }
}

pub fn daily_recurring(title: &str) -> NewTask {
    NewTask {
        is_recurring: true,
        recurring_rule: Some("FREQ=DAILY".to_string()),
        ..NewTask::new(title)
    }
}
